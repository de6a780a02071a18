//! JSON Schema dialect backed by the `jsonschema` crate

use jsonschema::JSONSchema;
use serde_json::Value;

use super::{CompilationError, Compiler, Validator, ValueError, Violation, JSON_SCHEMA};
use crate::schema::Definition;

/// Compiler for JSON Schema definitions (draft detected from `$schema`)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaCompiler;

impl Compiler for JsonSchemaCompiler {
    fn compile(&self, def: &Definition) -> Result<Box<dyn Validator>, CompilationError> {
        let document = Value::Object(def.clone());
        let schema = JSONSchema::compile(&document)
            .map_err(|e| CompilationError::new(JSON_SCHEMA, e))?;
        Ok(Box::new(JsonSchemaValidator { schema }))
    }
}

struct JsonSchemaValidator {
    schema: JSONSchema,
}

impl Validator for JsonSchemaValidator {
    fn validate(&self, input: &[u8]) -> Result<Vec<Violation>, ValueError> {
        let instance: Value =
            serde_json::from_slice(input).map_err(|e| ValueError::new(JSON_SCHEMA, e))?;

        let violations = match self.schema.validate(&instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| Violation::new(e.instance_path.to_string(), e.to_string()))
                .collect(),
        };
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_def() -> Definition {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer", "minimum": 0 }
            },
            "required": ["name"]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_conforming_value() {
        let validator = JsonSchemaCompiler.compile(&user_def()).unwrap();
        let violations = validator.validate(br#"{"name": "a"}"#).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_missing_required_property() {
        let validator = JsonSchemaCompiler.compile(&user_def()).unwrap();
        let violations = validator.validate(b"{}").unwrap();

        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("name"));
    }

    #[test]
    fn test_violation_path_points_at_field() {
        let validator = JsonSchemaCompiler.compile(&user_def()).unwrap();
        let violations = validator.validate(br#"{"name": "a", "age": -1}"#).unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/age");
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let validator = JsonSchemaCompiler.compile(&user_def()).unwrap();
        let err = validator.validate(b"{not json").unwrap_err();
        assert_eq!(err.dialect, JSON_SCHEMA);
    }

    #[test]
    fn test_invalid_definition_rejected() {
        let def = json!({ "type": "not-a-type" }).as_object().cloned().unwrap();
        let err = JsonSchemaCompiler.compile(&def).err().unwrap();
        assert!(err.to_string().starts_with("json-schema compiler:"));
    }
}
