use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Wire and storage format of `date_of_birth`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// A stored animal. Lambs are animals with `is_lamb` set.
#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    pub id: i64,
    pub tag_id: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    /// None unless the animal is female
    pub is_pregnant: Option<bool>,
    pub weight: Option<f64>,
    pub weaning_weight: Option<f64>,
    pub breed: Option<String>,
    pub medical_records: Option<String>,
    /// URL or stored filename, opaque to the domain
    pub image_reference: Option<String>,
    pub is_lamb: bool,
    pub mother_id: Option<i64>,
    pub father_id: Option<i64>,
}

/// An animal that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnimal {
    pub tag_id: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub is_pregnant: Option<bool>,
    pub weight: Option<f64>,
    pub weaning_weight: Option<f64>,
    pub breed: Option<String>,
    pub medical_records: Option<String>,
    pub image_reference: Option<String>,
    pub is_lamb: bool,
    pub mother_id: Option<i64>,
    pub father_id: Option<i64>,
}

impl NewAnimal {
    pub fn with_id(self, id: i64) -> Animal {
        Animal {
            id,
            tag_id: self.tag_id,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            is_pregnant: self.is_pregnant,
            weight: self.weight,
            weaning_weight: self.weaning_weight,
            breed: self.breed,
            medical_records: self.medical_records,
            image_reference: self.image_reference,
            is_lamb: self.is_lamb,
            mother_id: self.mother_id,
            father_id: self.father_id,
        }
    }
}

impl Animal {
    /// Whole years between birth and `today`.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let dob = self.date_of_birth;
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        years
    }

    /// Days between birth and `today`.
    pub fn age_days_on(&self, today: NaiveDate) -> i64 {
        (today - self.date_of_birth).num_days()
    }
}

/// An animal joined with the tags of its parents.
///
/// A parent tag is None when the parent id is unset or points at a deleted row.
#[derive(Debug, Clone, PartialEq)]
pub struct PedigreeRecord {
    pub animal: Animal,
    pub mother_tag: Option<String>,
    pub father_tag: Option<String>,
}

/// Column-level change set for a partial update.
///
/// None leaves the column as stored. For the nullable columns `Some(None)`
/// writes NULL. Pregnancy is recomputed against the gender the row ends up
/// with, so a male never carries a flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimalPatch {
    pub tag_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub is_pregnant: Option<bool>,
    pub weight: Option<f64>,
    pub weaning_weight: Option<f64>,
    pub breed: Option<Option<String>>,
    pub medical_records: Option<Option<String>>,
    pub image_reference: Option<Option<String>>,
    pub is_lamb: Option<bool>,
    pub mother_id: Option<Option<i64>>,
    pub father_id: Option<Option<i64>>,
}

impl AnimalPatch {
    /// True when the pregnancy column has to be rewritten
    pub fn touches_pregnancy(&self) -> bool {
        self.gender.is_some() || self.is_pregnant.is_some()
    }

    /// Parent ids the write will link to
    pub fn linked_parents(&self) -> impl Iterator<Item = i64> {
        [self.mother_id, self.father_id].into_iter().flatten().flatten()
    }
}

/// Filter for scans over the animal table. Empty filter means all rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimalFilter {
    pub is_lamb: Option<bool>,
    /// Matches either the mother or the father column
    pub parent_id: Option<i64>,
}

impl AnimalFilter {
    pub fn lambs() -> Self {
        Self {
            is_lamb: Some(true),
            parent_id: None,
        }
    }

    pub fn children_of(parent_id: i64) -> Self {
        Self {
            is_lamb: None,
            parent_id: Some(parent_id),
        }
    }
}

/// Which view of the table an operation runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleScope {
    /// Every animal
    Herd,
    /// Only animals flagged as lambs
    Lambs,
}
