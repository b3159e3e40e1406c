//! Conversion between the wire DTOs and the domain commands and views.

use chrono::NaiveDate;
use shared::{
    AnimalSummary, CreateAnimalRequest, LambDetail, LambFamily, SheepDetail, SheepFamily, UpdateAnimalRequest,
};

use crate::domain::models::DATE_FORMAT;
use crate::domain::{
    AnimalView, CreateAnimalCommand, ImageUpload, LambFamilyResult, SheepFamilyResult, UpdateAnimalCommand,
};

pub struct AnimalMapper;

impl AnimalMapper {
    pub fn to_create_command(request: CreateAnimalRequest, image: Option<ImageUpload>) -> CreateAnimalCommand {
        CreateAnimalCommand {
            tag_id: request.tag_id,
            gender: request.gender,
            dob: request.dob,
            pregnant: request.pregnant,
            weight: request.weight,
            weaning_weight: request.weaning_weight,
            breed: request.breed,
            medical_records: request.medical_records,
            image_url: request.image_url,
            image,
            mother_tag: request.mother_id,
            father_tag: request.father_id,
            is_lamb: request.is_lamb,
        }
    }

    pub fn to_update_command(request: UpdateAnimalRequest, image: Option<ImageUpload>) -> UpdateAnimalCommand {
        UpdateAnimalCommand {
            tag_id: request.tag_id,
            gender: request.gender,
            dob: request.dob,
            pregnant: request.pregnant,
            weight: request.weight,
            weaning_weight: request.weaning_weight,
            breed: request.breed,
            medical_records: request.medical_records,
            image_url: request.image_url,
            image,
            mother_tag: request.mother_id,
            father_tag: request.father_id,
            is_lamb: request.is_lamb,
        }
    }

    /// Parent ids go out as tags; a dangling parent shows as null.
    pub fn to_summary(view: &AnimalView, today: NaiveDate) -> AnimalSummary {
        let animal = &view.record.animal;
        AnimalSummary {
            id: animal.id,
            tag_id: animal.tag_id.clone(),
            dob: animal.date_of_birth.format(DATE_FORMAT).to_string(),
            gender: animal.gender.to_string(),
            pregnant: animal.is_pregnant,
            weight: animal.weight,
            weaning_weight: animal.weaning_weight,
            breed: animal.breed.clone(),
            medical_records: animal.medical_records.clone(),
            image_url: view.image_url.clone(),
            mother_id: view.record.mother_tag.clone(),
            father_id: view.record.father_tag.clone(),
            is_lamb: animal.is_lamb,
            age: animal.age_on(today),
        }
    }

    pub fn to_summaries(views: &[AnimalView], today: NaiveDate) -> Vec<AnimalSummary> {
        views.iter().map(|v| Self::to_summary(v, today)).collect()
    }

    pub fn to_sheep_detail(result: SheepFamilyResult, today: NaiveDate) -> SheepDetail {
        let animal = Self::to_summary(&result.view, today);
        SheepDetail {
            family: SheepFamily {
                mother: animal.mother_id.clone(),
                father: animal.father_id.clone(),
                children: result.children,
            },
            animal,
        }
    }

    pub fn to_lamb_detail(result: LambFamilyResult, today: NaiveDate) -> LambDetail {
        let animal = Self::to_summary(&result.view, today);
        LambDetail {
            age_days: result.view.record.animal.age_days_on(today),
            family: LambFamily {
                mother: animal.mother_id.clone(),
                father: animal.father_id.clone(),
                siblings: result.siblings,
            },
            animal,
        }
    }
}
