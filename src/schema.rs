//! Schema record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw schema definition, interpreted only by the dialect's compiler
pub type Definition = Map<String, Value>;

/// One immutable version of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique ID of the schema, assigned by the caller
    pub id: String,
    /// Dialect name; fixed at creation
    #[serde(rename = "type")]
    pub schema_type: String,
    /// When this version was written (UTC)
    pub time: DateTime<Utc>,
    /// Starts at 1 and increases by one per update
    pub version: u64,
    /// Definition of the schema
    pub def: Definition,
}

impl Schema {
    /// First version of a new schema
    pub fn initial(id: impl Into<String>, schema_type: impl Into<String>, def: Definition) -> Self {
        Self {
            id: id.into(),
            schema_type: schema_type.into(),
            time: Utc::now(),
            version: 1,
            def,
        }
    }

    /// The version that follows this one, carrying a new definition
    pub fn successor(&self, def: Definition) -> Self {
        Self {
            id: self.id.clone(),
            schema_type: self.schema_type.clone(),
            time: Utc::now(),
            version: self.version + 1,
            def,
        }
    }
}
