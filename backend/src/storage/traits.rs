//! # Storage Traits
//!
//! Abstractions the domain layer depends on. The SQLite repository and the
//! media stores implement them; tests and alternative backends can swap
//! implementations without touching the services.

use async_trait::async_trait;

use super::error::StorageResult;
use crate::domain::models::{AnimalFilter, AnimalPatch, NewAnimal, PedigreeRecord};

/// Persistence for animal records.
///
/// Tag uniqueness is enforced by the implementation at write time and
/// reported as `StorageError::DuplicateTag`. Writes that link parents check
/// in the same statement that those parents exist, and fail with
/// `StorageError::MissingParent` otherwise.
#[async_trait]
pub trait AnimalStorage: Send + Sync {
    /// Insert a new animal and return its assigned id.
    async fn insert_animal(&self, animal: &NewAnimal) -> StorageResult<i64>;

    /// Get an animal with its parents' tags
    async fn get_animal(&self, id: i64) -> StorageResult<Option<PedigreeRecord>>;

    /// Exact, case-sensitive tag lookup
    async fn find_by_tag(&self, tag: &str) -> StorageResult<Option<PedigreeRecord>>;

    /// Case-insensitive tag lookup returning the internal id.
    ///
    /// When several tags fold to the same value, an exact-case match wins,
    /// otherwise the oldest record.
    async fn find_id_by_tag_nocase(&self, tag: &str) -> StorageResult<Option<i64>>;

    /// Scan animals matching `filter`, ordered by id
    async fn list_animals(&self, filter: &AnimalFilter) -> StorageResult<Vec<PedigreeRecord>>;

    /// Write the columns set in `patch` and leave the others alone.
    /// Returns false if no row has that id.
    async fn patch_animal(&self, id: i64, patch: &AnimalPatch) -> StorageResult<bool>;

    /// Returns true if a row was deleted
    async fn delete_animal(&self, id: i64) -> StorageResult<bool>;

    /// Round trip to the database
    async fn ping(&self) -> StorageResult<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("file type '{0}' is not allowed")]
    DisallowedExtension(String),
    #[error("uploaded file is empty")]
    Empty,
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("image host request failed: {0}")]
    Remote(String),
}

/// Capability that turns uploaded bytes into a stored image reference.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store the file and return the reference to keep on the animal
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, UploadError>;

    /// Best-effort removal of a reference produced by `upload`
    async fn discard(&self, reference: &str);

    /// Absolute URL under which `reference` can be fetched
    fn public_url(&self, reference: &str) -> String;
}

/// True for references that are already absolute URLs.
pub fn is_absolute_url(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
