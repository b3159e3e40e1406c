//! Handlers for `/lambs`. Every operation is restricted to animals flagged
//! as lambs; a herd animal addressed here is answered with "Not a lamb".

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

/// Axum handler for POST /lambs
pub async fn create_lamb(
    State(state): State<AppState>,
    payload: AnimalPayload<CreateAnimalRequest>,
) -> impl IntoResponse {
    info!("POST /lambs - tag: {:?}", payload.body.tag_id);

    let command = AnimalMapper::to_create_command(payload.body, payload.image);
    match state.animal_service.create(RoleScope::Lambs, command).await {
        Ok(view) => {
            let response = AnimalResponse {
                message: "Lamb added successfully".to_string(),
                data: AnimalMapper::to_summary(&view, Local::now().date_naive()),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for GET /lambs
pub async fn list_lambs(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /lambs");

    match state.animal_service.list(RoleScope::Lambs).await {
        Ok(views) => Json(AnimalMapper::to_summaries(&views, Local::now().date_naive())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for GET /lambs/:id, with age in days and siblings
pub async fn get_lamb(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> impl IntoResponse {
    info!("GET /lambs/{}", id);

    match state.animal_service.lamb_family(id).await {
        Ok(result) => Json(AnimalMapper::to_lamb_detail(result, Local::now().date_naive())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for GET /lambs/by-parent/:tag
pub async fn lambs_by_parent(State(state): State<AppState>, ApiPath(tag): ApiPath<String>) -> impl IntoResponse {
    info!("GET /lambs/by-parent/{}", tag);

    match state.animal_service.lambs_by_parent(&tag).await {
        Ok(views) => Json(AnimalMapper::to_summaries(&views, Local::now().date_naive())).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for PUT /lambs/:id
pub async fn update_lamb(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    payload: AnimalPayload<UpdateAnimalRequest>,
) -> impl IntoResponse {
    info!("PUT /lambs/{}", id);

    let command = AnimalMapper::to_update_command(payload.body, payload.image);
    match state.animal_service.update(RoleScope::Lambs, id, command).await {
        Ok(view) => Json(AnimalResponse {
            message: "Lamb updated successfully".to_string(),
            data: AnimalMapper::to_summary(&view, Local::now().date_naive()),
        })
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Axum handler for DELETE /lambs/:id
pub async fn delete_lamb(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> impl IntoResponse {
    info!("DELETE /lambs/{}", id);

    match state.animal_service.delete(RoleScope::Lambs, id).await {
        Ok(animal) => Json(MessageResponse {
            message: format!("Lamb {} deleted", animal.tag_id),
        })
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
