//! Versioned Schema Store
//!
//! Persists schema history in an embedded `redb` database. Every schema ID
//! owns one table (its version collection) named `schema/<id>`:
//!
//! ```text
//! schema/user      1 -> {"id":"user","type":"json-schema","version":1,...}
//!                  2 -> {"id":"user","type":"json-schema","version":2,...}
//! schema/order     1 -> {"id":"order","type":"avro","version":1,...}
//! ```
//!
//! Version keys are fixed-width big-endian integers, so the byte order of the
//! keys equals the numeric order of the versions and the last key of a table
//! is always the latest version.
//!
//! Each operation runs in exactly one transaction. redb serializes write
//! transactions, so concurrent updates of the same ID each see the previous
//! commit and append distinct versions.

use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadTransaction, ReadableTable, TableDefinition, TableHandle};
use tracing::{debug, error, info};

use crate::compiler::{CompilerRegistry, Violation};
use crate::error::{Result, SchemaError};
use crate::schema::{Definition, Schema};

/// Name prefix of all version tables; the top-level `schema` collection
const SCHEMA_PREFIX: &str = "schema/";

/// Width of an encoded version key
pub const VERSION_KEY_LEN: usize = 8;

/// Order-preserving encoding of a version number
pub fn encode_version(version: u64) -> [u8; VERSION_KEY_LEN] {
    version.to_be_bytes()
}

/// Inverse of [`encode_version`]; `None` for keys of the wrong width
pub fn decode_version(key: &[u8]) -> Option<u64> {
    let bytes: [u8; VERSION_KEY_LEN] = key.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

fn table_name(id: &str) -> String {
    format!("{SCHEMA_PREFIX}{id}")
}

fn versions_table(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// Decode one stored entry, checking it belongs where it was found.
///
/// A record with an empty identity counts as absent.
fn decode_entry(id: &str, key: &[u8], value: &[u8]) -> Result<Schema> {
    let version = decode_version(key)
        .ok_or_else(|| SchemaError::decode(id, format!("version key has {} bytes", key.len())))?;
    let schema: Schema = serde_json::from_slice(value).map_err(|e| SchemaError::decode(id, e))?;

    if schema.id.is_empty() {
        return Err(SchemaError::version_not_found(id, version));
    }
    if schema.id != id {
        return Err(SchemaError::decode(
            id,
            format!("record of schema {} stored in this collection", schema.id),
        ));
    }
    if schema.version != version {
        return Err(SchemaError::decode(
            id,
            format!("record version {} stored under key {}", schema.version, version),
        ));
    }
    Ok(schema)
}

fn encode_entry(schema: &Schema) -> Result<Vec<u8>> {
    serde_json::to_vec(schema)
        .map_err(|e| SchemaError::Storage(format!("serialize schema {}: {}", schema.id, e)))
}

/// Persistent store of schema versions
pub struct SchemaStore {
    db: Database,
}

impl SchemaStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Database::create(path)?;
        info!(path = %path.display(), "opened schema store");
        Ok(Self { db })
    }

    /// A store that lives only in memory
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Ok(Self { db })
    }

    /// IDs of all stored schemas
    pub fn list(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read()?;
        let mut ids: Vec<String> = txn
            .list_tables()?
            .filter_map(|handle| handle.name().strip_prefix(SCHEMA_PREFIX).map(String::from))
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Latest version of a schema
    pub fn get(&self, id: &str) -> Result<Schema> {
        let txn = self.db.begin_read()?;
        let schema = latest_in_read(&txn, id)?;
        debug!(id, version = schema.version, "read latest schema");
        Ok(schema)
    }

    /// A specific version of a schema
    pub fn get_version(&self, id: &str, version: u64) -> Result<Schema> {
        let txn = self.db.begin_read()?;
        let name = table_name(id);
        let table = match txn.open_table(versions_table(&name)) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Err(SchemaError::not_found(id)),
            Err(e) => return Err(e.into()),
        };

        let key = encode_version(version);
        let entry = table
            .get(&key[..])?
            .ok_or_else(|| SchemaError::version_not_found(id, version))?;
        decode_entry(id, &key, entry.value())
    }

    /// Every stored version number of a schema, ascending
    pub fn versions(&self, id: &str) -> Result<Vec<u64>> {
        let txn = self.db.begin_read()?;
        let name = table_name(id);
        let table = match txn.open_table(versions_table(&name)) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Err(SchemaError::not_found(id)),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            let version = decode_version(key.value()).ok_or_else(|| {
                SchemaError::decode(id, format!("version key has {} bytes", key.value().len()))
            })?;
            versions.push(version);
        }
        if versions.is_empty() {
            return Err(SchemaError::not_found(id));
        }
        Ok(versions)
    }

    /// Create a schema at version 1.
    ///
    /// The definition must compile under `schema_type` before anything is
    /// written.
    pub fn create(
        &self,
        compilers: &CompilerRegistry,
        id: &str,
        schema_type: &str,
        def: Definition,
    ) -> Result<Schema> {
        if id.is_empty() {
            return Err(SchemaError::IdRequired);
        }
        if schema_type.is_empty() {
            return Err(SchemaError::TypeRequired);
        }
        let compiler = compilers
            .get(schema_type)
            .ok_or_else(|| SchemaError::TypeUnknown(schema_type.to_string()))?;
        compiler.compile(&def)?;

        let schema = Schema::initial(id, schema_type, def);
        let bytes = encode_entry(&schema)?;

        // Version tables are never left empty, so an empty table here was just
        // created by this transaction and is discarded if it aborts.
        let txn = self.db.begin_write()?;
        let name = table_name(id);
        {
            let mut table = txn.open_table(versions_table(&name))?;
            if table.last()?.is_some() {
                return Err(SchemaError::AlreadyExists { id: id.to_string() });
            }
            table.insert(&encode_version(schema.version)[..], bytes.as_slice())?;
        }
        txn.commit()?;

        info!(id, schema_type, version = schema.version, "created schema");
        Ok(schema)
    }

    /// Append a new version carrying `def`.
    ///
    /// Reading the latest version, compiling, and writing its successor all
    /// happen in one write transaction, so no concurrent update is lost.
    pub fn update(
        &self,
        compilers: &CompilerRegistry,
        id: &str,
        def: Definition,
    ) -> Result<Schema> {
        if id.is_empty() {
            return Err(SchemaError::IdRequired);
        }

        let txn = self.db.begin_write()?;
        let name = table_name(id);
        let schema = {
            let mut table = txn.open_table(versions_table(&name))?;
            let latest = match table.last()? {
                Some((key, value)) => decode_entry(id, key.value(), value.value())?,
                None => return Err(SchemaError::not_found(id)),
            };

            let compiler = compilers
                .get(&latest.schema_type)
                .ok_or_else(|| SchemaError::TypeUnknown(latest.schema_type.clone()))?;
            compiler.compile(&def)?;

            let next = latest.successor(def);
            let bytes = encode_entry(&next)?;
            table.insert(&encode_version(next.version)[..], bytes.as_slice())?;
            next
        };
        txn.commit()?;

        info!(id, version = schema.version, "updated schema");
        Ok(schema)
    }

    /// Remove a schema and its entire history
    pub fn delete(&self, id: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        let name = table_name(id);
        if !txn.delete_table(versions_table(&name))? {
            return Err(SchemaError::not_found(id));
        }
        txn.commit()?;

        info!(id, "deleted schema");
        Ok(())
    }

    /// Validate an encoded value against the latest version of a schema
    pub fn validate(
        &self,
        compilers: &CompilerRegistry,
        id: &str,
        input: &[u8],
    ) -> Result<Vec<Violation>> {
        let schema = {
            let txn = self.db.begin_read()?;
            latest_in_read(&txn, id)?
        };

        let compiler = compilers
            .get(&schema.schema_type)
            .ok_or_else(|| SchemaError::TypeUnknown(schema.schema_type.clone()))?;
        let validator = compiler.compile(&schema.def).map_err(|e| {
            let version = schema.version;
            error!(id, version, error = %e, "stored definition no longer compiles");
            e
        })?;

        let violations = validator.validate(input)?;
        debug!(id, version = schema.version, violations = violations.len(), "validated value");
        Ok(violations)
    }
}

fn latest_in_read(txn: &ReadTransaction, id: &str) -> Result<Schema> {
    let name = table_name(id);
    let table = match txn.open_table(versions_table(&name)) {
        Ok(table) => table,
        Err(redb::TableError::TableDoesNotExist(_)) => return Err(SchemaError::not_found(id)),
        Err(e) => return Err(e.into()),
    };

    let schema = match table.last()? {
        Some((key, value)) => decode_entry(id, key.value(), value.value())?,
        None => return Err(SchemaError::not_found(id)),
    };
    Ok(schema)
}
