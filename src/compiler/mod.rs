//! Schema Dialect Compilers
//!
//! A [`Compiler`] turns a raw [`Definition`] into a [`Validator`] for one
//! dialect. Compilers are looked up by dialect name in a [`CompilerRegistry`],
//! which is filled once while the service is being assembled and only read
//! afterwards.
//!
//! ## Built-in dialects
//! - `json-schema` — [`JsonSchemaCompiler`]
//! - `avro` — [`AvroCompiler`]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::Definition;

mod avro;
mod json_schema;

pub use avro::AvroCompiler;
pub use json_schema::JsonSchemaCompiler;

/// Dialect name of the JSON Schema compiler
pub const JSON_SCHEMA: &str = "json-schema";
/// Dialect name of the Avro compiler
pub const AVRO: &str = "avro";

/// A definition was rejected by its dialect
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{dialect} compiler: {reason}")]
pub struct CompilationError {
    pub dialect: String,
    pub reason: String,
}

impl CompilationError {
    pub fn new(dialect: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            dialect: dialect.into(),
            reason: reason.to_string(),
        }
    }
}

/// An input could not be decoded into a value the dialect understands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{dialect} validator: cannot decode input: {reason}")]
pub struct ValueError {
    pub dialect: String,
    pub reason: String,
}

impl ValueError {
    pub fn new(dialect: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            dialect: dialect.into(),
            reason: reason.to_string(),
        }
    }
}

/// A single way in which a value fails to conform to a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Location of the offending part of the value (JSON pointer, may be empty)
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Compiles a schema definition into a validator
pub trait Compiler: Send + Sync {
    fn compile(&self, def: &Definition) -> Result<Box<dyn Validator>, CompilationError>;
}

/// Checks whether encoded input values adhere to a compiled schema
pub trait Validator {
    /// Returns the violations found in `input`; an empty list means it conforms.
    ///
    /// Fails only when `input` cannot be decoded at all.
    fn validate(&self, input: &[u8]) -> Result<Vec<Violation>, ValueError>;
}

/// Dialect name to compiler mapping
#[derive(Clone, Default)]
pub struct CompilerRegistry {
    compilers: BTreeMap<String, Arc<dyn Compiler>>,
}

impl CompilerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in dialect
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(JSON_SCHEMA, JsonSchemaCompiler);
        registry.register(AVRO, AvroCompiler);
        registry
    }

    /// Insert or replace the compiler for a dialect
    pub fn register(&mut self, dialect: impl Into<String>, compiler: impl Compiler + 'static) {
        let dialect = dialect.into();
        tracing::debug!(dialect = %dialect, "registered schema compiler");
        self.compilers.insert(dialect, Arc::new(compiler));
    }

    /// Registered dialect names in lexicographic order
    pub fn types(&self) -> Vec<String> {
        self.compilers.keys().cloned().collect()
    }

    pub fn get(&self, dialect: &str) -> Option<&dyn Compiler> {
        self.compilers.get(dialect).map(|c| &**c)
    }
}

impl fmt::Debug for CompilerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerRegistry")
            .field("types", &self.types())
            .finish()
    }
}
