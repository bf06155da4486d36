//! PostgreSQL readers for health profiles and pregnancy dates.
//!
//! Both tables belong to the profile subsystem; this adapter only selects.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, HealthProfileId, UserId};
use crate::domain::health::{GestationSnapshot, HealthProfileSnapshot};
use crate::ports::{GestationProvider, HealthProfileReader};

/// Reads `health_profiles` and `pregnancy_info`.
#[derive(Clone)]
pub struct PostgresHealthProfileReader {
    pool: PgPool,
}

impl PostgresHealthProfileReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProfileReader for PostgresHealthProfileReader {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<HealthProfileSnapshot>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, height, pre_pregnancy_weight, current_weight, blood_type, age,
                   medical_history, family_history, allergies_history, obstetric_history,
                   is_smoking, is_drinking
            FROM health_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch health profile", e))?;

        row.map(|row| row_to_profile(row, user_id)).transpose()
    }
}

#[async_trait]
impl GestationProvider for PostgresHealthProfileReader {
    async fn current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GestationSnapshot>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT lmp_date, due_date
            FROM pregnancy_info
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("fetch pregnancy dates", e))?;

        Ok(row.map(|row| GestationSnapshot {
            lmp_date: row.get("lmp_date"),
            due_date: row.get("due_date"),
        }))
    }
}

fn row_to_profile(
    row: sqlx::postgres::PgRow,
    user_id: &UserId,
) -> Result<HealthProfileSnapshot, DomainError> {
    let id: Uuid = row.get("id");
    let age: i32 = row.get("age");

    Ok(HealthProfileSnapshot {
        id: HealthProfileId::from_uuid(id),
        user_id: user_id.clone(),
        height: row.get("height"),
        pre_pregnancy_weight: row.get("pre_pregnancy_weight"),
        current_weight: row.get("current_weight"),
        blood_type: row.get("blood_type"),
        age: stored_age(age)?,
        medical_history: row.get("medical_history"),
        family_history: row.get("family_history"),
        allergies_history: row.get("allergies_history"),
        obstetric_history: row.get("obstetric_history"),
        is_smoking: row.get("is_smoking"),
        is_drinking: row.get("is_drinking"),
    })
}

fn stored_age(age: i32) -> Result<u32, DomainError> {
    u32::try_from(age).map_err(|_| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored age: {}", age))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_age_rejects_negative_values() {
        assert_eq!(stored_age(31).unwrap(), 31);
        let err = stored_age(-1).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
