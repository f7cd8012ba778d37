//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: liveness and version probes
//! - `records`: raw document read/write through the store access layer

pub mod health;
pub mod records;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Root endpoint (GET /); requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "docstore-server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/health",
            "/version",
            "/records/{collection}/{uid}",
        ]
    })))
}

/// 404 Not Found handler for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
