//! # HTTP Transport
//!
//! | Route                       | Operation   |
//! |-----------------------------|-------------|
//! | `GET /types`                | types       |
//! | `POST /schema`              | create      |
//! | `GET /schema`               | list        |
//! | `GET /schema/:id`           | get         |
//! | `GET /schema/:id/:version`  | get_version |
//! | `PUT /schema/:id`           | update      |
//! | `DELETE /schema/:id`        | delete      |
//! | `POST /schema/:id`          | validate    |
//!
//! Store calls block, so every handler runs its service call on the blocking
//! thread pool.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::compiler::Violation;
use crate::error::Result;
use crate::schema::{Definition, Schema};
use crate::service::Service;

mod error;

pub use error::{ApiError, ErrorResponse};

/// Body of `POST /schema`
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub def: Definition,
}

/// Build the router over a shared service
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/types", get(list_types))
        .route("/schema", get(list_schemas).post(create_schema))
        .route(
            "/schema/:id",
            get(get_schema)
                .put(update_schema)
                .delete(delete_schema)
                .post(validate_value),
        )
        .route("/schema/:id/:version", get(get_schema_version))
        .with_state(service)
}

/// Run a service call on the blocking pool and log its outcome
async fn call<T, F>(
    method: &'static str,
    service: Arc<Service>,
    f: F,
) -> std::result::Result<T, ApiError>
where
    F: FnOnce(&Service) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let start = Instant::now();
    let outcome = match tokio::task::spawn_blocking(move || f(&service)).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(join_err) => Err(ApiError::internal(join_err)),
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    match &outcome {
        Ok(_) => tracing::info!(transport = "http", method, elapsed_us, "request handled"),
        Err(e) => tracing::warn!(
            transport = "http",
            method,
            elapsed_us,
            status = e.status.as_u16(),
            error = %e.message,
            "request failed"
        ),
    }
    outcome
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> std::result::Result<T, ApiError> {
    serde_json::from_slice(body).map_err(ApiError::bad_request)
}

async fn list_types(State(service): State<Arc<Service>>) -> Json<Vec<String>> {
    Json(service.types())
}

async fn list_schemas(
    State(service): State<Arc<Service>>,
) -> std::result::Result<Json<Vec<String>>, ApiError> {
    call("list", service, |s| s.list()).await.map(Json)
}

async fn create_schema(
    State(service): State<Arc<Service>>,
    body: Bytes,
) -> std::result::Result<Json<Schema>, ApiError> {
    let req: CreateRequest = parse_json(&body)?;
    call("create", service, move |s| s.create(&req.id, &req.schema_type, req.def))
        .await
        .map(Json)
}

async fn get_schema(
    State(service): State<Arc<Service>>,
    Path(id): Path<String>,
) -> std::result::Result<Json<Schema>, ApiError> {
    call("get", service, move |s| s.get(&id)).await.map(Json)
}

async fn get_schema_version(
    State(service): State<Arc<Service>>,
    path: std::result::Result<Path<(String, u64)>, PathRejection>,
) -> std::result::Result<Json<Schema>, ApiError> {
    let Path((id, version)) = path.map_err(|e| ApiError::bad_request(e.body_text()))?;
    call("get_version", service, move |s| s.get_version(&id, version))
        .await
        .map(Json)
}

async fn update_schema(
    State(service): State<Arc<Service>>,
    Path(id): Path<String>,
    body: Bytes,
) -> std::result::Result<Json<Schema>, ApiError> {
    let def: Definition = parse_json(&body)?;
    call("update", service, move |s| s.update(&id, def)).await.map(Json)
}

async fn delete_schema(
    State(service): State<Arc<Service>>,
    Path(id): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
    call("delete", service, move |s| s.delete(&id)).await?;
    Ok(StatusCode::OK)
}

async fn validate_value(
    State(service): State<Arc<Service>>,
    Path(id): Path<String>,
    body: Bytes,
) -> std::result::Result<Json<Vec<Violation>>, ApiError> {
    call("validate", service, move |s| s.validate(&id, &body))
        .await
        .map(Json)
}
