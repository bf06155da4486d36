//! AssessmentCacheStore port - persistence for cached assessments.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, HealthProfileId, UserId};
use crate::domain::health::CachedAssessment;

/// One cache row per (user, health profile).
///
/// Implementations must make `upsert` an atomic insert-or-update keyed by
/// `(user_id, health_profile_id)`, so retries and concurrent writers never
/// produce a second row. Concurrent writers race last-write-wins.
#[async_trait]
pub trait AssessmentCacheStore: Send + Sync {
    /// The cached row for this user and profile, if any.
    async fn lookup(
        &self,
        user_id: &UserId,
        health_profile_id: &HealthProfileId,
    ) -> Result<Option<CachedAssessment>, DomainError>;

    /// Inserts the row, or updates the existing one for the same key.
    ///
    /// Returns the row as stored. On update the stored `id` and `created_at`
    /// are kept; every other column takes the new value.
    async fn upsert(&self, entry: &CachedAssessment) -> Result<CachedAssessment, DomainError>;
}
