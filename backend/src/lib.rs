//! Backend for the sheep manager: a flock register with pedigree tracking,
//! served over a JSON REST API.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use config::{AppConfig, MediaBackend};
use domain::{AnimalService, PedigreeResolver};
use storage::{AnimalStorage, DbConnection, HostedMediaStore, LocalDiskMediaStore, MediaStore, SqliteAnimalRepository};

pub use io::rest::create_router;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub animal_service: AnimalService,
    pub db: DbConnection,
    pub config: Arc<AppConfig>,
}

/// Open the database and wire up the services described by `config`.
pub async fn initialize_backend(config: AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    build_state(db, config)
}

fn build_state(db: DbConnection, config: AppConfig) -> Result<AppState> {
    let media: Arc<dyn MediaStore> = match &config.media_backend {
        MediaBackend::Local => {
            info!("Storing images under {}", config.upload_dir.display());
            let store = LocalDiskMediaStore::new(config.upload_dir.clone(), &config.public_base_url)
                .with_context(|| format!("failed to create upload directory {}", config.upload_dir.display()))?;
            Arc::new(store)
        }
        MediaBackend::Hosted {
            upload_url,
            upload_preset,
        } => {
            info!("Uploading images to {}", upload_url);
            Arc::new(HostedMediaStore::new(upload_url.clone(), upload_preset.clone()))
        }
    };

    let storage: Arc<dyn AnimalStorage> = Arc::new(SqliteAnimalRepository::new(db.clone()));
    let resolver = PedigreeResolver::new(storage.clone(), config.parent_policy);
    info!("Parent tag policy: {:?}", resolver.policy());
    let animal_service = AnimalService::new(storage, resolver, media);

    Ok(AppState {
        animal_service,
        db,
        config: Arc::new(config),
    })
}

/// State over an in-memory database with images stored in `upload_dir`
#[cfg(test)]
pub(crate) async fn test_state(upload_dir: &std::path::Path) -> AppState {
    let config = AppConfig {
        upload_dir: upload_dir.to_path_buf(),
        public_base_url: "http://farm.test".to_string(),
        ..AppConfig::default()
    };
    let db = DbConnection::init_test().await.expect("Failed to create test database");
    build_state(db, config).expect("Failed to build test state")
}
