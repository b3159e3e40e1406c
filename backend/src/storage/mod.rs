//! # Storage Module
//!
//! Persistence for the flock: the SQLite animal table and the image stores.
//!
//! - **connection** - pool lifecycle and schema setup
//! - **sqlite** - `AnimalStorage` over the `sheep` table
//! - **media** - local-disk and hosted implementations of `MediaStore`
//! - **traits** - the abstractions the domain layer depends on

pub mod connection;
pub mod error;
pub mod media;
pub mod sqlite;
pub mod traits;

pub use connection::DbConnection;
pub use error::{StorageError, StorageResult};
pub use media::{HostedMediaStore, LocalDiskMediaStore};
pub use sqlite::SqliteAnimalRepository;
pub use traits::{AnimalStorage, MediaStore, UploadError};
