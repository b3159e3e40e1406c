use serde::{Deserialize, Serialize};

pub mod flexible;

/// Body accepted by `POST /sheep` and `POST /lambs`.
///
/// Every field is optional at the wire level so that missing required fields
/// can be reported together by the service instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateAnimalRequest {
    pub tag_id: Option<String>,
    /// "male" or "female" (any casing)
    pub gender: Option<String>,
    /// Date of birth, YYYY-MM-DD
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "flexible::option_bool")]
    pub pregnant: Option<bool>,
    #[serde(default, deserialize_with = "flexible::option_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "flexible::option_f64")]
    pub weaning_weight: Option<f64>,
    pub breed: Option<String>,
    pub medical_records: Option<String>,
    /// Already hosted image; ignored when a file is uploaded alongside
    pub image_url: Option<String>,
    /// Tag of the mother, resolved case-insensitively
    pub mother_id: Option<String>,
    /// Tag of the father, resolved case-insensitively
    pub father_id: Option<String>,
    #[serde(default, deserialize_with = "flexible::option_bool")]
    pub is_lamb: Option<bool>,
}

/// Body accepted by `PUT /sheep/:id` and `PUT /lambs/:id`.
///
/// Absent fields keep their stored value. An empty `mother_id`/`father_id`
/// clears the parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAnimalRequest {
    pub tag_id: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "flexible::option_bool")]
    pub pregnant: Option<bool>,
    #[serde(default, deserialize_with = "flexible::option_f64")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "flexible::option_f64")]
    pub weaning_weight: Option<f64>,
    pub breed: Option<String>,
    pub medical_records: Option<String>,
    pub image_url: Option<String>,
    pub mother_id: Option<String>,
    pub father_id: Option<String>,
    #[serde(default, deserialize_with = "flexible::option_bool")]
    pub is_lamb: Option<bool>,
}

/// One animal as listed by the collection endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSummary {
    pub id: i64,
    pub tag_id: String,
    pub dob: String,
    pub gender: String,
    /// Only present for females
    pub pregnant: Option<bool>,
    pub weight: Option<f64>,
    pub weaning_weight: Option<f64>,
    pub breed: Option<String>,
    pub medical_records: Option<String>,
    /// Absolute URL of the image, if any
    pub image_url: Option<String>,
    /// Mother's tag, not her internal id
    pub mother_id: Option<String>,
    /// Father's tag, not his internal id
    pub father_id: Option<String>,
    pub is_lamb: bool,
    /// Whole years since birth
    pub age: i32,
}

/// Pedigree of a herd animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheepFamily {
    pub mother: Option<String>,
    pub father: Option<String>,
    pub children: Vec<String>,
}

/// Response of `GET /sheep/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheepDetail {
    #[serde(flatten)]
    pub animal: AnimalSummary,
    pub family: SheepFamily,
}

/// Pedigree of a lamb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambFamily {
    pub mother: Option<String>,
    pub father: Option<String>,
    /// Other children of either parent
    pub siblings: Vec<String>,
}

/// Response of `GET /lambs/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambDetail {
    #[serde(flatten)]
    pub animal: AnimalSummary,
    pub age_days: i64,
    pub family: LambFamily,
}

/// Response of create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalResponse {
    pub message: String,
    pub data: AnimalSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
