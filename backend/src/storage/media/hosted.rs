use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, warn};

use crate::storage::traits::{MediaStore, UploadError};

/// Uploads images to a hosted image service using an unsigned upload preset.
///
/// The service answers with JSON carrying the public `secure_url`, which is
/// stored as-is on the animal.
#[derive(Debug, Clone)]
pub struct HostedMediaStore {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct HostedUploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

impl HostedMediaStore {
    pub fn new(upload_url: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: upload_url.into(),
            upload_preset: upload_preset.into(),
        }
    }
}

#[async_trait]
impl MediaStore for HostedMediaStore {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let form = Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .part("file", Part::bytes(bytes).file_name(filename.to_string()));

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Remote(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UploadError::Remote(format!("status {}", response.status())));
        }

        let body: HostedUploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Remote(e.to_string()))?;

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| UploadError::Remote("response carried no url".to_string()))?;

        info!("Uploaded image {} to {}", filename, url);
        Ok(url)
    }

    async fn discard(&self, reference: &str) {
        // Unsigned presets cannot delete; the orphan is left to the host's retention rules.
        warn!("Hosted image {} was not removed", reference);
    }

    fn public_url(&self, reference: &str) -> String {
        reference.to_string()
    }
}
