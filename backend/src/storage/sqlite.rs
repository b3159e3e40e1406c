use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::connection::DbConnection;
use super::error::{StorageError, StorageResult};
use super::traits::AnimalStorage;
use crate::domain::models::{Animal, AnimalFilter, AnimalPatch, Gender, NewAnimal, PedigreeRecord};

const SELECT_WITH_PARENTS: &str = r#"
    SELECT a.id, a.tag_id, a.date_of_birth, a.gender, a.is_pregnant,
           a.weight, a.weaning_weight, a.breed, a.medical_records,
           a.image_reference, a.is_lamb, a.mother_id, a.father_id,
           m.tag_id AS mother_tag, f.tag_id AS father_tag
    FROM sheep a
    LEFT JOIN sheep m ON m.id = a.mother_id
    LEFT JOIN sheep f ON f.id = a.father_id
"#;

/// SQLite-backed animal repository
#[derive(Clone)]
pub struct SqliteAnimalRepository {
    db: DbConnection,
}

impl SqliteAnimalRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn record_from_row(row: &SqliteRow) -> StorageResult<PedigreeRecord> {
        let gender: String = row.try_get("gender")?;
        let gender = gender.parse::<Gender>().map_err(StorageError::CorruptRow)?;

        let animal = Animal {
            id: row.try_get("id")?,
            tag_id: row.try_get("tag_id")?,
            date_of_birth: row.try_get("date_of_birth")?,
            gender,
            is_pregnant: row.try_get("is_pregnant")?,
            weight: row.try_get("weight")?,
            weaning_weight: row.try_get("weaning_weight")?,
            breed: row.try_get("breed")?,
            medical_records: row.try_get("medical_records")?,
            image_reference: row.try_get("image_reference")?,
            is_lamb: row.try_get("is_lamb")?,
            mother_id: row.try_get("mother_id")?,
            father_id: row.try_get("father_id")?,
        };

        Ok(PedigreeRecord {
            animal,
            mother_tag: row.try_get("mother_tag")?,
            father_tag: row.try_get("father_tag")?,
        })
    }
}

#[async_trait]
impl AnimalStorage for SqliteAnimalRepository {
    async fn insert_animal(&self, animal: &NewAnimal) -> StorageResult<i64> {
        // INSERT ... SELECT so the parent check and the write are one statement
        let result = sqlx::query(
            r#"
            INSERT INTO sheep (tag_id, date_of_birth, gender, is_pregnant, weight,
                               weaning_weight, breed, medical_records, image_reference,
                               is_lamb, mother_id, father_id)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            WHERE (? IS NULL OR EXISTS (SELECT 1 FROM sheep WHERE id = ?))
              AND (? IS NULL OR EXISTS (SELECT 1 FROM sheep WHERE id = ?))
            "#,
        )
        .bind(&animal.tag_id)
        .bind(animal.date_of_birth)
        .bind(animal.gender.as_str())
        .bind(animal.is_pregnant)
        .bind(animal.weight)
        .bind(animal.weaning_weight)
        .bind(&animal.breed)
        .bind(&animal.medical_records)
        .bind(&animal.image_reference)
        .bind(animal.is_lamb)
        .bind(animal.mother_id)
        .bind(animal.father_id)
        .bind(animal.mother_id)
        .bind(animal.mother_id)
        .bind(animal.father_id)
        .bind(animal.father_id)
        .execute(self.db.pool())
        .await
        .map_err(|e| StorageError::from_write(e, &animal.tag_id))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::MissingParent);
        }
        Ok(result.last_insert_rowid())
    }

    async fn get_animal(&self, id: i64) -> StorageResult<Option<PedigreeRecord>> {
        let sql = format!("{} WHERE a.id = ?", SELECT_WITH_PARENTS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn find_by_tag(&self, tag: &str) -> StorageResult<Option<PedigreeRecord>> {
        let sql = format!("{} WHERE a.tag_id = ?", SELECT_WITH_PARENTS);
        let row = sqlx::query(&sql)
            .bind(tag)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn find_id_by_tag_nocase(&self, tag: &str) -> StorageResult<Option<i64>> {
        // The ORDER BY comparison uses the column's BINARY collation, so an
        // exact-case match sorts first.
        let row = sqlx::query(
            r#"
            SELECT id FROM sheep
            WHERE tag_id = ? COLLATE NOCASE
            ORDER BY (tag_id = ?) DESC, id ASC
            LIMIT 1
            "#,
        )
        .bind(tag)
        .bind(tag)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| r.get("id")))
    }

    async fn list_animals(&self, filter: &AnimalFilter) -> StorageResult<Vec<PedigreeRecord>> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_WITH_PARENTS);
        builder.push(" WHERE 1 = 1");

        if let Some(is_lamb) = filter.is_lamb {
            builder.push(" AND a.is_lamb = ").push_bind(is_lamb);
        }
        if let Some(parent_id) = filter.parent_id {
            builder
                .push(" AND (a.mother_id = ")
                .push_bind(parent_id)
                .push(" OR a.father_id = ")
                .push_bind(parent_id)
                .push(")");
        }
        builder.push(" ORDER BY a.id ASC");

        let rows = builder.build().fetch_all(self.db.pool()).await?;
        rows.iter().map(Self::record_from_row).collect()
    }

    async fn patch_animal(&self, id: i64, patch: &AnimalPatch) -> StorageResult<bool> {
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE sheep SET updated_at = CURRENT_TIMESTAMP");

        if let Some(tag_id) = &patch.tag_id {
            builder.push(", tag_id = ").push_bind(tag_id.clone());
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            builder.push(", date_of_birth = ").push_bind(date_of_birth);
        }
        if let Some(gender) = patch.gender {
            builder.push(", gender = ").push_bind(gender.as_str());
        }
        if patch.touches_pregnancy() {
            // SET expressions see the row as it was before this statement
            builder.push(", is_pregnant = CASE WHEN ");
            match patch.gender {
                Some(gender) => {
                    builder.push_bind(gender.as_str());
                }
                None => {
                    builder.push("gender");
                }
            }
            builder
                .push(" = 'female' THEN COALESCE(")
                .push_bind(patch.is_pregnant)
                .push(", is_pregnant, 0) ELSE NULL END");
        }
        if let Some(weight) = patch.weight {
            builder.push(", weight = ").push_bind(weight);
        }
        if let Some(weaning_weight) = patch.weaning_weight {
            builder.push(", weaning_weight = ").push_bind(weaning_weight);
        }
        if let Some(breed) = &patch.breed {
            builder.push(", breed = ").push_bind(breed.clone());
        }
        if let Some(medical_records) = &patch.medical_records {
            builder.push(", medical_records = ").push_bind(medical_records.clone());
        }
        if let Some(image_reference) = &patch.image_reference {
            builder.push(", image_reference = ").push_bind(image_reference.clone());
        }
        if let Some(is_lamb) = patch.is_lamb {
            builder.push(", is_lamb = ").push_bind(is_lamb);
        }
        if let Some(mother_id) = patch.mother_id {
            builder.push(", mother_id = ").push_bind(mother_id);
        }
        if let Some(father_id) = patch.father_id {
            builder.push(", father_id = ").push_bind(father_id);
        }

        builder.push(" WHERE id = ").push_bind(id);
        for parent_id in patch.linked_parents() {
            builder
                .push(" AND EXISTS (SELECT 1 FROM sheep p WHERE p.id = ")
                .push_bind(parent_id)
                .push(")");
        }

        let tag = patch.tag_id.clone().unwrap_or_default();
        let result = builder
            .build()
            .execute(self.db.pool())
            .await
            .map_err(|e| StorageError::from_write(e, &tag))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if patch.linked_parents().next().is_none() {
            return Ok(false);
        }

        // Nothing written: either the row or one of the parents is gone
        let row_exists = sqlx::query("SELECT 1 FROM sheep WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .is_some();
        if row_exists {
            Err(StorageError::MissingParent)
        } else {
            Ok(false)
        }
    }

    async fn delete_animal(&self, id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM sheep WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(self.db.pool()).await?;
        Ok(())
    }
}
