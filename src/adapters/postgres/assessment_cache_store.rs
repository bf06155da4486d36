//! PostgreSQL implementation of AssessmentCacheStore.
//!
//! One row per (user_id, health_profile_id) in `health_risk_assessments`,
//! AI payloads stored as JSONB. Writes use `INSERT ... ON CONFLICT`, so the
//! unique key is enforced by the database rather than by a read-then-write.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{
    AssessmentId, DomainError, ErrorCode, HealthProfileId, Timestamp, UserId,
};
use crate::domain::health::{CachedAssessment, ContentHash};
use crate::ports::AssessmentCacheStore;

/// PostgreSQL implementation of AssessmentCacheStore.
#[derive(Clone)]
pub struct PostgresAssessmentCacheStore {
    pool: PgPool,
}

impl PostgresAssessmentCacheStore {
    /// Creates a new PostgresAssessmentCacheStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, user_id, health_profile_id, bmi_category, bmi_risk, age_risk, \
     ai_analysis, personalized_recommendations, is_ai_enhanced, health_data_hash, \
     created_at, updated_at";

#[async_trait]
impl AssessmentCacheStore for PostgresAssessmentCacheStore {
    async fn lookup(
        &self,
        user_id: &UserId,
        health_profile_id: &HealthProfileId,
    ) -> Result<Option<CachedAssessment>, DomainError> {
        let sql = format!(
            "SELECT {} FROM health_risk_assessments WHERE user_id = $1 AND health_profile_id = $2",
            COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(user_id.as_str())
            .bind(health_profile_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("fetch cached assessment", e))?;

        row.map(row_to_cached_assessment).transpose()
    }

    async fn upsert(&self, entry: &CachedAssessment) -> Result<CachedAssessment, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO health_risk_assessments (
                id, user_id, health_profile_id, bmi_category, bmi_risk, age_risk,
                ai_analysis, personalized_recommendations, is_ai_enhanced,
                health_data_hash, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id, health_profile_id) DO UPDATE SET
                bmi_category = EXCLUDED.bmi_category,
                bmi_risk = EXCLUDED.bmi_risk,
                age_risk = EXCLUDED.age_risk,
                ai_analysis = EXCLUDED.ai_analysis,
                personalized_recommendations = EXCLUDED.personalized_recommendations,
                is_ai_enhanced = EXCLUDED.is_ai_enhanced,
                health_data_hash = EXCLUDED.health_data_hash,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(entry.id.as_uuid())
            .bind(entry.user_id.as_str())
            .bind(entry.health_profile_id.as_uuid())
            .bind(&entry.bmi_category)
            .bind(&entry.bmi_risk)
            .bind(&entry.age_risk)
            .bind(&entry.ai_analysis_json)
            .bind(&entry.personalized_recommendations_json)
            .bind(entry.is_ai_enhanced)
            .bind(entry.health_data_hash.as_str())
            .bind(entry.created_at.as_datetime())
            .bind(entry.updated_at.as_datetime())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database("upsert cached assessment", e))?;

        row_to_cached_assessment(row)
    }
}

fn row_to_cached_assessment(row: sqlx::postgres::PgRow) -> Result<CachedAssessment, DomainError> {
    let id: Uuid = row.get("id");
    let user_id: String = row.get("user_id");
    let health_profile_id: Uuid = row.get("health_profile_id");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");
    let health_data_hash: String = row.get("health_data_hash");

    Ok(CachedAssessment {
        id: AssessmentId::from_uuid(id),
        user_id: UserId::new(user_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored user_id: {}", e))
        })?,
        health_profile_id: HealthProfileId::from_uuid(health_profile_id),
        bmi_category: row.get("bmi_category"),
        bmi_risk: row.get("bmi_risk"),
        age_risk: row.get("age_risk"),
        ai_analysis_json: row.get("ai_analysis"),
        personalized_recommendations_json: row.get("personalized_recommendations"),
        is_ai_enhanced: row.get("is_ai_enhanced"),
        health_data_hash: ContentHash::from_stored(health_data_hash),
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    })
}
