//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::SchemaError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way to the HTTP client
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl ToString) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    pub fn internal(message: impl ToString) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        let status = match &err {
            SchemaError::NotFound { .. } => StatusCode::NOT_FOUND,
            SchemaError::AlreadyExists { .. } => StatusCode::CONFLICT,
            e if e.is_caller_error() => StatusCode::UNPROCESSABLE_ENTITY,
            SchemaError::InvalidValue(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompilationError, ValueError};

    fn status(err: SchemaError) -> StatusCode {
        ApiError::from(err).status
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status(SchemaError::NotFound { id: "a".into(), version: None }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(SchemaError::AlreadyExists { id: "a".into() }),
            StatusCode::CONFLICT
        );
        assert_eq!(status(SchemaError::IdRequired), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status(SchemaError::TypeRequired), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status(SchemaError::TypeUnknown("xml".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(SchemaError::InvalidValue(ValueError::new("json-schema", "eof"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(SchemaError::Compilation(CompilationError::new("avro", "bad"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(SchemaError::Storage("disk".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
