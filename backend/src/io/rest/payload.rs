//! Extractors for the animal endpoints: a body extractor accepting JSON,
//! url-encoded forms and multipart uploads, and a path extractor. Both
//! reject with the JSON error body.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Form, Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ApiError;
use crate::domain::{ImageUpload, ValidationError};

/// Multipart field carrying the image file.
pub const IMAGE_FIELD: &str = "image";

/// Decoded body plus the uploaded image, if the request was multipart.
#[derive(Debug)]
pub struct AnimalPayload<T> {
    pub body: T,
    pub image: Option<ImageUpload>,
}

fn malformed(err: impl std::fmt::Display) -> ApiError {
    ValidationError::Malformed(err.to_string()).into()
}

/// `Path` whose rejection is a 400 `VALIDATION_ERROR` instead of plain text.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await.map_err(malformed)?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for AnimalPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await.map_err(malformed)?;
            return read_multipart(multipart).await;
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(body) = Form::<T>::from_request(req, state).await.map_err(malformed)?;
            return Ok(Self { body, image: None });
        }

        let Json(body) = Json::<T>::from_request(req, state).await.map_err(malformed)?;
        Ok(Self { body, image: None })
    }
}

async fn read_multipart<T: DeserializeOwned>(mut multipart: Multipart) -> Result<AnimalPayload<T>, ApiError> {
    let mut fields = Map::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(malformed)?;
            // Browsers send an empty part when no file was picked
            if !filename.is_empty() && !bytes.is_empty() {
                image = Some(ImageUpload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let text = field.text().await.map_err(malformed)?;
        fields.insert(name, Value::String(text));
    }

    let body = serde_json::from_value(Value::Object(fields)).map_err(malformed)?;
    Ok(AnimalPayload { body, image })
}
