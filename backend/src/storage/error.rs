#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("tag '{0}' is already taken")]
    DuplicateTag(String),
    /// A linked parent was gone when the write ran; nothing was written
    #[error("a linked parent no longer exists")]
    MissingParent,
    #[error("stored row is invalid: {0}")]
    CorruptRow(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Maps a unique-constraint violation on the tag column to `DuplicateTag`.
    pub(crate) fn from_write(err: sqlx::Error, tag: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StorageError::DuplicateTag(tag.to_string());
            }
        }
        StorageError::Database(err)
    }
}
