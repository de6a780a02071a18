//! Schema Registry Service
//!
//! Wires a [`CompilerRegistry`] to a [`SchemaStore`] and exposes the single
//! contract consumed by transports. Compilers are registered while the
//! service is still exclusively owned (`&mut self`); once it is shared behind
//! an `Arc` the set of dialects is fixed.

use crate::compiler::{Compiler, CompilerRegistry, Violation};
use crate::error::Result;
use crate::schema::{Definition, Schema};
use crate::store::SchemaStore;

pub struct Service {
    compilers: CompilerRegistry,
    store: SchemaStore,
}

impl Service {
    /// Service with no dialects registered
    pub fn new(store: SchemaStore) -> Self {
        Self::with_compilers(store, CompilerRegistry::new())
    }

    pub fn with_compilers(store: SchemaStore, compilers: CompilerRegistry) -> Self {
        Self { compilers, store }
    }

    /// Service with the `json-schema` and `avro` dialects registered
    pub fn with_builtin_compilers(store: SchemaStore) -> Self {
        Self::with_compilers(store, CompilerRegistry::with_builtin())
    }

    /// Register a compiler by schema type
    pub fn register(&mut self, schema_type: impl Into<String>, compiler: impl Compiler + 'static) {
        self.compilers.register(schema_type, compiler);
    }

    /// Registered schema types, sorted
    pub fn types(&self) -> Vec<String> {
        self.compilers.types()
    }

    /// IDs of all schemas
    pub fn list(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Latest version of a schema
    pub fn get(&self, id: &str) -> Result<Schema> {
        self.store.get(id)
    }

    pub fn get_version(&self, id: &str, version: u64) -> Result<Schema> {
        self.store.get_version(id, version)
    }

    /// Stored version numbers of a schema, ascending
    pub fn versions(&self, id: &str) -> Result<Vec<u64>> {
        self.store.versions(id)
    }

    pub fn create(&self, id: &str, schema_type: &str, def: Definition) -> Result<Schema> {
        self.store.create(&self.compilers, id, schema_type, def)
    }

    pub fn update(&self, id: &str, def: Definition) -> Result<Schema> {
        self.store.update(&self.compilers, id, def)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id)
    }

    /// Validate an encoded value against the latest version of a schema
    pub fn validate(&self, id: &str, input: &[u8]) -> Result<Vec<Violation>> {
        self.store.validate(&self.compilers, id, input)
    }
}
