use crate::storage::StorageError;

/// Input rejected before the store was touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid gender '{0}'. Use male or female")]
    InvalidGender(String),
    #[error("{0} must be a positive number")]
    NonPositive(&'static str),
    #[error("Tag ID cannot be empty")]
    EmptyTag,
    #[error("Malformed request: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AnimalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Parent sheep with tag_id '{tag}' not found")]
    ParentNotFound { tag: String },
    #[error("Tag ID '{0}' already exists")]
    DuplicateTag(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Animal {0} is not a lamb")]
    NotALamb(i64),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StorageError> for AnimalError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateTag(tag) => AnimalError::DuplicateTag(tag),
            other => AnimalError::Internal(other.into()),
        }
    }
}

pub type AnimalResult<T> = Result<T, AnimalError>;
