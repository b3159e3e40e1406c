//! Health, maintenance and fallback handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use shared::{HealthResponse, MessageResponse};
use tracing::{info, warn};

use super::error::ApiError;
use crate::AppState;

/// Axum handler for GET /health
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let reachable = state.animal_service.storage_reachable().await;

    let (status, body) = if reachable {
        (
            StatusCode::OK,
            HealthResponse {
                status: "ok".to_string(),
                database: "connected".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "degraded".to_string(),
                database: "disconnected".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        )
    };
    (status, Json(body))
}

/// Axum handler for POST /admin/migrate
pub async fn run_migrations(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /admin/migrate");

    match state.db.run_migrations().await {
        Ok(()) => Json(MessageResponse {
            message: "Schema is up to date".to_string(),
        })
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    warn!("Unknown route requested");
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Resource not found" })))
}
