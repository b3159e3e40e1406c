use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::storage::traits::{is_absolute_url, MediaStore, UploadError};

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Writes images into a directory served under `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalDiskMediaStore {
    upload_dir: PathBuf,
    public_base_url: String,
}

impl LocalDiskMediaStore {
    /// Creates the upload directory if it does not exist yet
    pub fn new(upload_dir: impl Into<PathBuf>, public_base_url: &str) -> std::io::Result<Self> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self {
            upload_dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Reduce a client-supplied filename to `[A-Za-z0-9._-]`, dropping any path.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

fn allowed_extension(filename: &str) -> Result<String, UploadError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(UploadError::DisallowedExtension(extension))
    }
}

#[async_trait]
impl MediaStore for LocalDiskMediaStore {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        allowed_extension(filename)?;

        let stored_name = format!("{}_{}", uuid::Uuid::new_v4().simple(), sanitize_filename(filename));
        let path = self.upload_dir.join(&stored_name);
        tokio::fs::write(&path, &bytes).await?;

        info!("Stored image {} ({} bytes)", stored_name, bytes.len());
        Ok(stored_name)
    }

    async fn discard(&self, reference: &str) {
        if is_absolute_url(reference) {
            return;
        }
        let path = self.upload_dir.join(sanitize_filename(reference));
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Could not remove image {}: {}", path.display(), e);
        }
    }

    fn public_url(&self, reference: &str) -> String {
        if is_absolute_url(reference) {
            reference.to_string()
        } else {
            format!("{}/uploads/{}", self.public_base_url, reference)
        }
    }
}
