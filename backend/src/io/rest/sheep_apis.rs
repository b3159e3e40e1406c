//! Handlers for `/sheep`, covering every animal regardless of the lamb flag.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use shared::{AnimalResponse, CreateAnimalRequest, MessageResponse, UpdateAnimalRequest};
use tracing::info;

use super::error::ApiError;
use super::mappers::AnimalMapper;
use super::payload::{AnimalPayload, ApiPath};
use crate::domain::models::RoleScope;
use crate::AppState;

/// Axum handler for POST /sheep
pub async fn create_sheep(
    State(state): State<AppState>,
    payload: AnimalPayload<CreateAnimalRequest>,
) -> impl IntoResponse {
    info!("POST /sheep - tag: {:?}", payload.body.tag_id);

    let command = AnimalMapper::to_create_command(payload.body, payload.image);
    match state.animal_service.create(RoleScope::Herd, command).await {
        Ok(view) => {
            let response = AnimalResponse {
                message: "Sheep added successfully".to_string(),
                data: AnimalMapper::to_summary(&view, Local::now().date_naive()),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for GET /sheep
pub async fn list_sheep(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /sheep");

    match state.animal_service.list(RoleScope::Herd).await {
        Ok(views) => Json(AnimalMapper::to_summaries(&views, Local::now().date_naive())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for GET /sheep/:id, with parents and children
pub async fn get_sheep(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> impl IntoResponse {
    info!("GET /sheep/{}", id);

    match state.animal_service.sheep_family(id).await {
        Ok(result) => Json(AnimalMapper::to_sheep_detail(result, Local::now().date_naive())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for GET /sheep/by_tag/:tag_id
pub async fn get_sheep_by_tag(State(state): State<AppState>, ApiPath(tag_id): ApiPath<String>) -> impl IntoResponse {
    info!("GET /sheep/by_tag/{}", tag_id);

    match state.animal_service.get_by_tag(&tag_id).await {
        Ok(view) => Json(AnimalMapper::to_summary(&view, Local::now().date_naive())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for PUT /sheep/:id
pub async fn update_sheep(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    payload: AnimalPayload<UpdateAnimalRequest>,
) -> impl IntoResponse {
    info!("PUT /sheep/{}", id);

    let command = AnimalMapper::to_update_command(payload.body, payload.image);
    match state.animal_service.update(RoleScope::Herd, id, command).await {
        Ok(view) => Json(AnimalResponse {
            message: "Sheep updated successfully".to_string(),
            data: AnimalMapper::to_summary(&view, Local::now().date_naive()),
        })
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for DELETE /sheep/:id
pub async fn delete_sheep(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> impl IntoResponse {
    info!("DELETE /sheep/{}", id);

    match state.animal_service.delete(RoleScope::Herd, id).await {
        Ok(animal) => Json(MessageResponse {
            message: format!("Sheep {} deleted", animal.tag_id),
        })
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
