use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::commands::{
    AnimalView, CreateAnimalCommand, ImageUpload, LambFamilyResult, SheepFamilyResult,
    UpdateAnimalCommand,
};
use super::errors::{AnimalError, AnimalResult, ValidationError};
use super::models::{
    Animal, AnimalFilter, AnimalPatch, Gender, NewAnimal, PedigreeRecord, RoleScope, DATE_FORMAT,
};
use super::pedigree::PedigreeResolver;
use crate::storage::{AnimalStorage, MediaStore, StorageError};

/// Writes retried when a linked parent is deleted under them
const LINK_ATTEMPTS: usize = 3;

/// Parent tags as the client sent them, kept to resolve again after a lost race
#[derive(Debug, Clone, Copy)]
struct ParentTags<'a> {
    mother: Option<&'a str>,
    father: Option<&'a str>,
}

/// CRUD over the flock, composing the store, the pedigree resolver and the
/// media store.
#[derive(Clone)]
pub struct AnimalService {
    storage: Arc<dyn AnimalStorage>,
    resolver: PedigreeResolver,
    media: Arc<dyn MediaStore>,
}

impl AnimalService {
    pub fn new(
        storage: Arc<dyn AnimalStorage>,
        resolver: PedigreeResolver,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            storage,
            resolver,
            media,
        }
    }

    /// Create an animal. The lamb scope forces the lamb flag on.
    pub async fn create(&self, scope: RoleScope, command: CreateAnimalCommand) -> AnimalResult<AnimalView> {
        info!("Creating animal: tag={:?}, scope={:?}", command.tag_id, scope);

        let missing: Vec<String> = [
            ("tag_id", &command.tag_id),
            ("gender", &command.gender),
            ("dob", &command.dob),
        ]
        .iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name.to_string())
        .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing).into());
        }

        let tag_id = command.tag_id.as_deref().unwrap_or_default().trim().to_string();
        let date_of_birth = parse_date(command.dob.as_deref().unwrap_or_default())?;
        let gender = parse_gender(command.gender.as_deref().unwrap_or_default())?;
        check_positive("weight", command.weight)?;
        check_positive("weaning_weight", command.weaning_weight)?;

        let mother_id = self.resolver.resolve(command.mother_tag.as_deref()).await?;
        let father_id = self.resolver.resolve(command.father_tag.as_deref()).await?;

        let is_lamb = scope == RoleScope::Lambs || command.is_lamb.unwrap_or(false);
        let is_pregnant = match gender {
            Gender::Female => Some(command.pregnant.unwrap_or(false)),
            Gender::Male => None,
        };

        let uploaded = match command.image {
            Some(upload) => self.store_image(upload).await,
            None => None,
        };
        let image_reference = uploaded.clone().or_else(|| non_empty(command.image_url));

        let mut new_animal = NewAnimal {
            tag_id,
            date_of_birth,
            gender,
            is_pregnant,
            weight: command.weight,
            weaning_weight: command.weaning_weight,
            breed: non_empty(command.breed),
            medical_records: non_empty(command.medical_records),
            image_reference,
            is_lamb,
            mother_id,
            father_id,
        };

        let parents = ParentTags {
            mother: command.mother_tag.as_deref(),
            father: command.father_tag.as_deref(),
        };
        let id = match self.insert_linked(&mut new_animal, parents).await {
            Ok(id) => id,
            Err(e) => {
                if let Some(reference) = uploaded {
                    self.media.discard(&reference).await;
                }
                return Err(e);
            }
        };

        info!("Created animal {} with id {}", new_animal.tag_id, id);
        self.load(id).await
    }

    /// List every animal in scope
    pub async fn list(&self, scope: RoleScope) -> AnimalResult<Vec<AnimalView>> {
        let filter = match scope {
            RoleScope::Herd => AnimalFilter::default(),
            RoleScope::Lambs => AnimalFilter::lambs(),
        };
        let records = self.storage.list_animals(&filter).await?;
        info!("Found {} animals in scope {:?}", records.len(), scope);
        Ok(records.into_iter().map(|r| self.view(r)).collect())
    }

    pub async fn get(&self, scope: RoleScope, id: i64) -> AnimalResult<AnimalView> {
        let record = self.fetch_in_scope(scope, id).await?;
        Ok(self.view(record))
    }

    /// Tag lookup, case-insensitive like parent resolution
    pub async fn get_by_tag(&self, tag: &str) -> AnimalResult<AnimalView> {
        let id = self
            .resolver
            .lookup(tag)
            .await?
            .ok_or_else(|| AnimalError::NotFound(format!("Sheep with tag_id '{}'", tag.trim())))?;
        self.load(id).await
    }

    /// Animal plus the tags of every child it mothered or fathered
    pub async fn sheep_family(&self, id: i64) -> AnimalResult<SheepFamilyResult> {
        let record = self.fetch_in_scope(RoleScope::Herd, id).await?;
        let children = self
            .storage
            .list_animals(&AnimalFilter::children_of(id))
            .await?
            .into_iter()
            .map(|r| r.animal.tag_id)
            .collect();

        Ok(SheepFamilyResult {
            view: self.view(record),
            children,
        })
    }

    /// Lamb plus the tags of the other children of its mother and father
    pub async fn lamb_family(&self, id: i64) -> AnimalResult<LambFamilyResult> {
        let record = self.fetch_in_scope(RoleScope::Lambs, id).await?;

        let mut siblings = BTreeMap::new();
        for parent_id in [record.animal.mother_id, record.animal.father_id].into_iter().flatten() {
            for child in self.storage.list_animals(&AnimalFilter::children_of(parent_id)).await? {
                if child.animal.id != id {
                    siblings.insert(child.animal.id, child.animal.tag_id);
                }
            }
        }

        Ok(LambFamilyResult {
            view: self.view(record),
            siblings: siblings.into_values().collect(),
        })
    }

    /// Apply a partial update. Invalid dates are rejected, never skipped.
    pub async fn update(&self, scope: RoleScope, id: i64, command: UpdateAnimalCommand) -> AnimalResult<AnimalView> {
        info!("Updating animal {} in scope {:?}", id, scope);

        self.fetch_in_scope(scope, id).await?;

        let mut patch = AnimalPatch::default();
        if let Some(tag) = command.tag_id {
            let tag = tag.trim();
            if tag.is_empty() {
                return Err(ValidationError::EmptyTag.into());
            }
            patch.tag_id = Some(tag.to_string());
        }
        if let Some(dob) = command.dob.as_deref() {
            patch.date_of_birth = Some(parse_date(dob)?);
        }
        if let Some(gender) = command.gender.as_deref() {
            patch.gender = Some(parse_gender(gender)?);
        }
        if let Some(weight) = command.weight {
            check_positive("weight", Some(weight))?;
            patch.weight = Some(weight);
        }
        if let Some(weaning_weight) = command.weaning_weight {
            check_positive("weaning_weight", Some(weaning_weight))?;
            patch.weaning_weight = Some(weaning_weight);
        }
        patch.breed = command.breed.map(|breed| non_empty(Some(breed)));
        patch.medical_records = command.medical_records.map(|notes| non_empty(Some(notes)));
        patch.is_lamb = command.is_lamb;
        patch.is_pregnant = command.pregnant;

        if let Some(tag) = command.mother_tag.as_deref() {
            patch.mother_id = Some(self.resolver.resolve(Some(tag)).await?);
        }
        if let Some(tag) = command.father_tag.as_deref() {
            patch.father_id = Some(self.resolver.resolve(Some(tag)).await?);
        }

        // A failed upload falls back to the URL sent alongside, if any
        let uploaded = match command.image {
            Some(upload) => self.store_image(upload).await,
            None => None,
        };
        if let Some(reference) = &uploaded {
            patch.image_reference = Some(Some(reference.clone()));
        } else if let Some(url) = command.image_url {
            patch.image_reference = Some(non_empty(Some(url)));
        }

        let parents = ParentTags {
            mother: command.mother_tag.as_deref(),
            father: command.father_tag.as_deref(),
        };
        let updated = match self.patch_linked(id, &mut patch, parents).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(reference) = uploaded {
                    self.media.discard(&reference).await;
                }
                return Err(e);
            }
        };
        if !updated {
            // Deleted between the read and the write
            return Err(not_found(scope, id));
        }

        let view = self.load(id).await?;
        info!("Updated animal {} ({})", id, view.record.animal.tag_id);
        Ok(view)
    }

    /// Hard delete. Children keep their now dangling parent ids.
    pub async fn delete(&self, scope: RoleScope, id: i64) -> AnimalResult<Animal> {
        info!("Deleting animal {} in scope {:?}", id, scope);

        let animal = self.fetch_in_scope(scope, id).await?.animal;
        if !self.storage.delete_animal(id).await? {
            return Err(not_found(scope, id));
        }

        info!("Deleted animal {} ({})", id, animal.tag_id);
        Ok(animal)
    }

    /// Lambs whose mother or father carries `parent_tag`
    pub async fn lambs_by_parent(&self, parent_tag: &str) -> AnimalResult<Vec<AnimalView>> {
        let parent_id = self
            .resolver
            .lookup(parent_tag)
            .await?
            .ok_or_else(|| AnimalError::NotFound("Parent sheep".to_string()))?;

        let filter = AnimalFilter {
            is_lamb: Some(true),
            parent_id: Some(parent_id),
        };
        let records = self.storage.list_animals(&filter).await?;
        info!("Parent {} has {} lambs", parent_tag, records.len());
        Ok(records.into_iter().map(|r| self.view(r)).collect())
    }

    /// Storage connectivity for the health endpoint
    pub async fn storage_reachable(&self) -> bool {
        match self.storage.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Storage ping failed: {}", e);
                false
            }
        }
    }

    async fn fetch_in_scope(&self, scope: RoleScope, id: i64) -> AnimalResult<PedigreeRecord> {
        let record = self.storage.get_animal(id).await?.ok_or_else(|| {
            warn!("Animal {} not found", id);
            not_found(scope, id)
        })?;

        if scope == RoleScope::Lambs && !record.animal.is_lamb {
            return Err(AnimalError::NotALamb(id));
        }
        Ok(record)
    }

    /// Insert, resolving the parent tags again if a parent vanished since
    /// they were first resolved. The strict policy then reports the tag.
    async fn insert_linked(&self, animal: &mut NewAnimal, parents: ParentTags<'_>) -> AnimalResult<i64> {
        for _ in 0..LINK_ATTEMPTS {
            match self.storage.insert_animal(animal).await {
                Err(StorageError::MissingParent) => {
                    warn!("A parent of {} was deleted during the write, resolving again", animal.tag_id);
                    animal.mother_id = self.resolver.resolve(parents.mother).await?;
                    animal.father_id = self.resolver.resolve(parents.father).await?;
                }
                other => return Ok(other?),
            }
        }
        Err(AnimalError::Internal(anyhow::anyhow!(
            "parents of {} kept disappearing during the write",
            animal.tag_id
        )))
    }

    /// Patch counterpart of `insert_linked`; only parents named in the
    /// request are resolved again.
    async fn patch_linked(&self, id: i64, patch: &mut AnimalPatch, parents: ParentTags<'_>) -> AnimalResult<bool> {
        for _ in 0..LINK_ATTEMPTS {
            match self.storage.patch_animal(id, patch).await {
                Err(StorageError::MissingParent) => {
                    warn!("A parent linked to animal {} was deleted during the write, resolving again", id);
                    if let Some(tag) = parents.mother {
                        patch.mother_id = Some(self.resolver.resolve(Some(tag)).await?);
                    }
                    if let Some(tag) = parents.father {
                        patch.father_id = Some(self.resolver.resolve(Some(tag)).await?);
                    }
                }
                other => return Ok(other?),
            }
        }
        Err(AnimalError::Internal(anyhow::anyhow!(
            "parents of animal {} kept disappearing during the write",
            id
        )))
    }

    async fn load(&self, id: i64) -> AnimalResult<AnimalView> {
        let record = self
            .storage
            .get_animal(id)
            .await?
            .ok_or_else(|| AnimalError::Internal(anyhow::anyhow!("animal {} vanished after write", id)))?;
        Ok(self.view(record))
    }

    /// Upload failures degrade to no image.
    async fn store_image(&self, upload: ImageUpload) -> Option<String> {
        match self.media.upload(upload.bytes, &upload.filename).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!("Image upload of '{}' failed, continuing without image: {}", upload.filename, e);
                None
            }
        }
    }

    fn view(&self, record: PedigreeRecord) -> AnimalView {
        let image_url = record
            .animal
            .image_reference
            .as_deref()
            .map(|reference| self.media.public_url(reference));
        AnimalView { record, image_url }
    }
}

fn not_found(scope: RoleScope, id: i64) -> AnimalError {
    match scope {
        RoleScope::Herd => AnimalError::NotFound(format!("Sheep {}", id)),
        RoleScope::Lambs => AnimalError::NotFound(format!("Lamb {}", id)),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

fn parse_gender(raw: &str) -> Result<Gender, ValidationError> {
    raw.parse::<Gender>()
        .map_err(|_| ValidationError::InvalidGender(raw.trim().to_string()))
}

fn check_positive(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(v > 0.0) || !v.is_finite() => Err(ValidationError::NonPositive(field)),
        _ => Ok(()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
