//! Tag → id resolution for parent references.

use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use super::errors::{AnimalError, AnimalResult};
use crate::storage::AnimalStorage;

/// What to do when a parent tag matches no animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentPolicy {
    /// Fail with `ParentNotFound`
    #[default]
    Strict,
    /// Treat the parent as unspecified
    Lenient,
}

impl FromStr for ParentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ParentPolicy::Strict),
            "lenient" => Ok(ParentPolicy::Lenient),
            other => Err(format!("unknown parent policy '{}'", other)),
        }
    }
}

#[derive(Clone)]
pub struct PedigreeResolver {
    storage: Arc<dyn AnimalStorage>,
    policy: ParentPolicy,
}

impl PedigreeResolver {
    pub fn new(storage: Arc<dyn AnimalStorage>, policy: ParentPolicy) -> Self {
        Self { storage, policy }
    }

    pub fn policy(&self) -> ParentPolicy {
        self.policy
    }

    /// Case-insensitive lookup of `tag` that never fails on a miss.
    pub async fn lookup(&self, tag: &str) -> AnimalResult<Option<i64>> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Ok(None);
        }
        Ok(self.storage.find_id_by_tag_nocase(tag).await?)
    }

    /// Resolve an optional parent tag to an internal id.
    ///
    /// Empty input means no parent. A miss fails or yields None depending on
    /// the policy.
    pub async fn resolve(&self, tag: Option<&str>) -> AnimalResult<Option<i64>> {
        let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        match self.storage.find_id_by_tag_nocase(tag).await? {
            Some(id) => {
                info!("Resolved parent tag '{}' to id {}", tag, id);
                Ok(Some(id))
            }
            None => {
                warn!("Parent tag '{}' not found", tag);
                match self.policy {
                    ParentPolicy::Strict => Err(AnimalError::ParentNotFound { tag: tag.to_string() }),
                    ParentPolicy::Lenient => Ok(None),
                }
            }
        }
    }
}
