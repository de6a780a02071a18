//! Schema Registry
//!
//! A versioned, append-only registry for structured data schemas. Clients
//! register a named schema under a dialect, update its definition while the
//! full history is kept, and validate values against the latest definition.
//!
//! ## Features
//!
//! - **Append-only history**: every update writes a new immutable version
//! - **Atomic operations**: each call runs in a single store transaction
//! - **Pluggable dialects**: JSON Schema and Avro built in, more via [`Compiler`]
//!
//! ## Storage layout
//!
//! ```text
//! schema/<id>
//! ├── 0000000000000001 -> {"id", "type", "time", "version": 1, "def"}
//! ├── 0000000000000002 -> {"id", "type", "time", "version": 2, "def"}
//! └── ...
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod schema;
pub mod service;
pub mod store;
pub mod transport;

pub use compiler::{
    AvroCompiler, CompilationError, Compiler, CompilerRegistry, JsonSchemaCompiler, Validator,
    ValueError, Violation,
};
pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use schema::{Definition, Schema};
pub use service::Service;
pub use store::SchemaStore;
