//! Runtime configuration read from the environment.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::ParentPolicy;

/// Where uploaded images go.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaBackend {
    /// Files under `upload_dir`, served at `/uploads`
    Local,
    /// A hosted image service accepting unsigned multipart uploads
    Hosted { upload_url: String, upload_preset: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub upload_dir: PathBuf,
    /// Prefix for URLs of locally stored images
    pub public_base_url: String,
    pub parent_policy: ParentPolicy,
    pub media_backend: MediaBackend,
    /// Allowed CORS origin; any origin when None
    pub cors_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database_url: "sqlite:sheepmanager.db".to_string(),
            upload_dir: PathBuf::from("uploads"),
            public_base_url: "http://localhost:5000".to_string(),
            parent_policy: ParentPolicy::Strict,
            media_backend: MediaBackend::Local,
            cors_origin: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, after reading `.env` if present.
    ///
    /// # Environment Variables
    /// - `BIND_ADDR` (default `127.0.0.1:5000`)
    /// - `DATABASE_URL` (default `sqlite:sheepmanager.db`)
    /// - `UPLOAD_DIR` (default `uploads`)
    /// - `PUBLIC_BASE_URL` (default `http://localhost:5000`)
    /// - `PARENT_POLICY`: `strict` | `lenient` (default `strict`)
    /// - `MEDIA_BACKEND`: `local` | `hosted` (default `local`)
    /// - `MEDIA_UPLOAD_URL`, `MEDIA_UPLOAD_PRESET`: required when hosted
    /// - `CORS_ORIGIN` (optional)
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .with_context(|| format!("BIND_ADDR '{}' is not a socket address", raw))?,
            None => defaults.bind_addr,
        };

        let parent_policy = match get("PARENT_POLICY") {
            Some(raw) => raw.parse::<ParentPolicy>().map_err(|e| anyhow!(e))?,
            None => defaults.parent_policy,
        };

        let media_backend = match get("MEDIA_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("local") => MediaBackend::Local,
            Some("hosted") => MediaBackend::Hosted {
                upload_url: get("MEDIA_UPLOAD_URL")
                    .ok_or_else(|| anyhow!("MEDIA_UPLOAD_URL is required when MEDIA_BACKEND=hosted"))?,
                upload_preset: get("MEDIA_UPLOAD_PRESET")
                    .ok_or_else(|| anyhow!("MEDIA_UPLOAD_PRESET is required when MEDIA_BACKEND=hosted"))?,
            },
            Some(other) => return Err(anyhow!("unknown MEDIA_BACKEND '{}'", other)),
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            public_base_url: get("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            parent_policy,
            media_backend,
            cors_origin: get("CORS_ORIGIN"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.database_url, "sqlite:sheepmanager.db");
        assert_eq!(config.parent_policy, ParentPolicy::Strict);
        assert_eq!(config.media_backend, MediaBackend::Local);
        assert_eq!(config.cors_origin, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("DATABASE_URL", "sqlite:/var/lib/flock.db"),
            ("PARENT_POLICY", "lenient"),
            ("UPLOAD_DIR", "/srv/images"),
            ("CORS_ORIGIN", " "),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_url, "sqlite:/var/lib/flock.db");
        assert_eq!(config.parent_policy, ParentPolicy::Lenient);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/images"));
        assert_eq!(config.cors_origin, None);
    }

    #[test]
    fn test_hosted_media_requires_settings() {
        assert!(config_from(&[("MEDIA_BACKEND", "hosted")]).is_err());

        let config = config_from(&[
            ("MEDIA_BACKEND", "Hosted"),
            ("MEDIA_UPLOAD_URL", "https://api.images.example/v1/upload"),
            ("MEDIA_UPLOAD_PRESET", "flock"),
        ])
        .unwrap();
        assert_eq!(
            config.media_backend,
            MediaBackend::Hosted {
                upload_url: "https://api.images.example/v1/upload".to_string(),
                upload_preset: "flock".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("BIND_ADDR", "not-an-address")]).is_err());
        assert!(config_from(&[("PARENT_POLICY", "sometimes")]).is_err());
        assert!(config_from(&[("MEDIA_BACKEND", "ftp")]).is_err());
    }
}
