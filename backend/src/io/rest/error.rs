//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use tracing::error;

use crate::domain::{AnimalError, ValidationError};

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub AnimalError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AnimalError::Validation(_) | AnimalError::NotALamb(_) => StatusCode::BAD_REQUEST,
            AnimalError::ParentNotFound { .. } | AnimalError::NotFound(_) => StatusCode::NOT_FOUND,
            AnimalError::DuplicateTag(_) => StatusCode::CONFLICT,
            AnimalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match &self.0 {
            AnimalError::Validation(_) => "VALIDATION_ERROR",
            AnimalError::NotALamb(_) => "NOT_A_LAMB",
            AnimalError::ParentNotFound { .. } => "PARENT_NOT_FOUND",
            AnimalError::NotFound(_) => "NOT_FOUND",
            AnimalError::DuplicateTag(_) => "DUPLICATE_TAG",
            AnimalError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            AnimalError::Internal(e) => {
                // Details stay in the log
                error!("Internal error: {:?}", e);
                "Internal server error".to_string()
            }
            AnimalError::NotALamb(_) => "Not a lamb".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AnimalError> for ApiError {
    fn from(err: AnimalError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(AnimalError::Validation(err))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(AnimalError::Internal(err))
    }
}
