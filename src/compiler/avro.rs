//! Apache Avro dialect

use apache_avro::{from_avro_datum, Schema as AvroSchema};
use serde_json::Value;

use super::{CompilationError, Compiler, Validator, ValueError, Violation, AVRO};
use crate::schema::Definition;

/// Compiler for Avro schema definitions.
///
/// Inputs are single Avro binary datums written with the compiled schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvroCompiler;

impl Compiler for AvroCompiler {
    fn compile(&self, def: &Definition) -> Result<Box<dyn Validator>, CompilationError> {
        let schema = AvroSchema::parse(&Value::Object(def.clone()))
            .map_err(|e| CompilationError::new(AVRO, e))?;
        Ok(Box::new(AvroValidator { schema }))
    }
}

struct AvroValidator {
    schema: AvroSchema,
}

impl Validator for AvroValidator {
    fn validate(&self, input: &[u8]) -> Result<Vec<Violation>, ValueError> {
        let mut reader = input;

        // A datum that does not decode under the schema is non-conformance.
        if let Err(e) = from_avro_datum(&self.schema, &mut reader, None) {
            return Ok(vec![Violation::new("", e.to_string())]);
        }

        if !reader.is_empty() {
            return Ok(vec![Violation::new(
                "",
                format!("{} trailing bytes after datum", reader.len()),
            )]);
        }

        Ok(Vec::new())
    }
}
