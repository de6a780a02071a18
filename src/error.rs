//! Error types for the schema registry

use thiserror::Error;

use crate::compiler::{CompilationError, ValueError};

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema registry errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema does not exist: {id}{}", version_suffix(.version))]
    NotFound { id: String, version: Option<u64> },

    #[error("schema exists: {id}")]
    AlreadyExists { id: String },

    #[error("schema id required")]
    IdRequired,

    #[error("schema type required")]
    TypeRequired,

    #[error("unknown schema type: {0}")]
    TypeUnknown(String),

    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error(transparent)]
    InvalidValue(#[from] ValueError),

    #[error("corrupt record for schema {id}: {reason}")]
    Decode { id: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),
}

fn version_suffix(version: &Option<u64>) -> String {
    version.map(|v| format!(" version {v}")).unwrap_or_default()
}

impl SchemaError {
    pub(crate) fn not_found(id: &str) -> Self {
        SchemaError::NotFound {
            id: id.to_string(),
            version: None,
        }
    }

    pub(crate) fn version_not_found(id: &str, version: u64) -> Self {
        SchemaError::NotFound {
            id: id.to_string(),
            version: Some(version),
        }
    }

    pub(crate) fn decode(id: &str, reason: impl ToString) -> Self {
        SchemaError::Decode {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for input errors detected before any store transaction is opened
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SchemaError::IdRequired | SchemaError::TypeRequired | SchemaError::TypeUnknown(_)
        )
    }
}

macro_rules! storage_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for SchemaError {
                fn from(err: $source) -> Self {
                    SchemaError::Storage(redb::Error::from(err).to_string())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::Error,
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            SchemaError::not_found("user").to_string(),
            "schema does not exist: user"
        );
        assert_eq!(
            SchemaError::version_not_found("user", 3).to_string(),
            "schema does not exist: user version 3"
        );
    }

    #[test]
    fn test_caller_errors() {
        assert!(SchemaError::IdRequired.is_caller_error());
        assert!(SchemaError::TypeUnknown("xml".into()).is_caller_error());
        assert!(!SchemaError::not_found("a").is_caller_error());
        assert!(!SchemaError::Storage("disk".into()).is_caller_error());
    }
}
