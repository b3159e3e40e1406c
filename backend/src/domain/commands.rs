//! Domain-level command and result types.
//!
//! These are not exposed over the API. The REST layer maps the DTOs from the
//! `shared` crate onto them.

use super::models::PedigreeRecord;

/// Raw image bytes received with a request.
#[derive(Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Input for creating an animal. Values are unvalidated.
#[derive(Debug, Clone, Default)]
pub struct CreateAnimalCommand {
    pub tag_id: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub pregnant: Option<bool>,
    pub weight: Option<f64>,
    pub weaning_weight: Option<f64>,
    pub breed: Option<String>,
    pub medical_records: Option<String>,
    pub image_url: Option<String>,
    pub image: Option<ImageUpload>,
    pub mother_tag: Option<String>,
    pub father_tag: Option<String>,
    pub is_lamb: Option<bool>,
}

/// Partial update. None leaves the stored value untouched; an empty parent
/// tag or image URL clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateAnimalCommand {
    pub tag_id: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub pregnant: Option<bool>,
    pub weight: Option<f64>,
    pub weaning_weight: Option<f64>,
    pub breed: Option<String>,
    pub medical_records: Option<String>,
    pub image_url: Option<String>,
    pub image: Option<ImageUpload>,
    pub mother_tag: Option<String>,
    pub father_tag: Option<String>,
    pub is_lamb: Option<bool>,
}

/// An animal ready for display: parent tags joined, image reference made absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalView {
    pub record: PedigreeRecord,
    pub image_url: Option<String>,
}

/// An animal with the tags of its children.
#[derive(Debug, Clone, PartialEq)]
pub struct SheepFamilyResult {
    pub view: AnimalView,
    pub children: Vec<String>,
}

/// A lamb with the tags of the other children of its parents.
#[derive(Debug, Clone, PartialEq)]
pub struct LambFamilyResult {
    pub view: AnimalView,
    pub siblings: Vec<String>,
}
