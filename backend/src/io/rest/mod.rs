//! # REST API
//!
//! Axum handlers for the flock register, one module per resource. Handlers
//! map the `shared` DTOs onto domain commands with [`mappers::AnimalMapper`]
//! and map domain errors onto status codes with [`error::ApiError`].
//!
//! Request bodies for create and update may be JSON, url-encoded forms or
//! multipart uploads; see [`payload::AnimalPayload`].

pub mod error;
pub mod lamb_apis;
pub mod mappers;
pub mod payload;
pub mod sheep_apis;
pub mod system_apis;

#[cfg(test)]
mod tests;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::AppState;

/// Upper bound for request bodies, images included.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the application router over `state`.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());
    let uploads = ServeDir::new(state.config.upload_dir.clone());

    let sheep_routes = Router::new()
        .route("/sheep", get(sheep_apis::list_sheep).post(sheep_apis::create_sheep))
        .route(
            "/sheep/:id",
            get(sheep_apis::get_sheep)
                .put(sheep_apis::update_sheep)
                .delete(sheep_apis::delete_sheep),
        )
        .route("/sheep/by_tag/:tag_id", get(sheep_apis::get_sheep_by_tag));

    let lamb_routes = Router::new()
        .route("/lambs", get(lamb_apis::list_lambs).post(lamb_apis::create_lamb))
        .route(
            "/lambs/:id",
            get(lamb_apis::get_lamb)
                .put(lamb_apis::update_lamb)
                .delete(lamb_apis::delete_lamb),
        )
        .route("/lambs/by-parent/:tag", get(lamb_apis::lambs_by_parent));

    Router::new()
        .merge(sheep_routes)
        .merge(lamb_routes)
        .route("/health", get(system_apis::health_check))
        .route("/admin/migrate", post(system_apis::run_migrations))
        .nest_service("/uploads", uploads)
        .fallback(system_apis::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    match origin.map(|o| o.parse::<HeaderValue>()) {
        Some(Ok(value)) => layer.allow_origin(value),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS_ORIGIN: {}", e);
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
