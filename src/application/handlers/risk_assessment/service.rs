//! RiskAssessmentService - cache-or-compute entry point.
//!
//! A cached row is reused when the hash of the live profile matches the
//! stored one. Otherwise a fresh assessment is computed and written back
//! best-effort: callers get their result even if the write fails.

use std::sync::Arc;
use thiserror::Error;

use super::assembler::AssessmentAssembler;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::health::{
    CachedAssessment, ContentHasher, GestationSnapshot, HealthProfileSnapshot,
    RiskAssessmentResult,
};
use crate::ports::{AssessmentCacheStore, GestationProvider, HealthProfileReader};

/// Errors surfaced by [`RiskAssessmentService`].
///
/// AI, cache, and pregnancy-date failures never appear here.
#[derive(Debug, Error)]
pub enum RiskAssessmentError {
    /// The user has no health profile yet.
    #[error("Health profile not found for user {user_id}")]
    ProfileNotFound { user_id: UserId },

    /// The profile itself could not be read.
    #[error("Infrastructure error: {0}")]
    Infrastructure(#[from] DomainError),
}

pub struct RiskAssessmentService {
    profiles: Arc<dyn HealthProfileReader>,
    gestation: Arc<dyn GestationProvider>,
    cache: Arc<dyn AssessmentCacheStore>,
    assembler: AssessmentAssembler,
}

impl RiskAssessmentService {
    pub fn new(
        profiles: Arc<dyn HealthProfileReader>,
        gestation: Arc<dyn GestationProvider>,
        cache: Arc<dyn AssessmentCacheStore>,
        assembler: AssessmentAssembler,
    ) -> Self {
        Self {
            profiles,
            gestation,
            cache,
            assembler,
        }
    }

    /// Returns the cached assessment when still valid, else computes one.
    ///
    /// A cache hit performs no write and no AI call.
    pub async fn get_or_compute(
        &self,
        user_id: &UserId,
    ) -> Result<RiskAssessmentResult, RiskAssessmentError> {
        let profile = self.load_profile(user_id).await?;
        let hash = ContentHasher::hash(&profile);

        let cached = self.lookup_cached(&profile).await;

        if let Some(row) = cached.as_ref().filter(|row| row.is_fresh_for(&hash)) {
            tracing::debug!(user_id = %user_id, "Risk assessment cache hit");
            return Ok(self.assembler.from_cache(row, &profile));
        }

        tracing::debug!(
            user_id = %user_id,
            stale = cached.is_some(),
            "Risk assessment cache miss"
        );
        Ok(self.compute_and_store(&profile, cached.as_ref()).await)
    }

    /// Always recomputes, ignoring any cached row, then writes it back.
    pub async fn force_refresh(
        &self,
        user_id: &UserId,
    ) -> Result<RiskAssessmentResult, RiskAssessmentError> {
        let profile = self.load_profile(user_id).await?;

        let previous = self.lookup_cached(&profile).await;
        Ok(self.compute_and_store(&profile, previous.as_ref()).await)
    }

    async fn load_profile(
        &self,
        user_id: &UserId,
    ) -> Result<HealthProfileSnapshot, RiskAssessmentError> {
        self.profiles
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| RiskAssessmentError::ProfileNotFound {
                user_id: user_id.clone(),
            })
    }

    /// Reads the cached row; a failing store counts as an empty one.
    async fn lookup_cached(&self, profile: &HealthProfileSnapshot) -> Option<CachedAssessment> {
        match self.cache.lookup(&profile.user_id, &profile.id).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Cache lookup failed, treating as miss: {}", e);
                None
            }
        }
    }

    async fn load_gestation(&self, user_id: &UserId) -> Option<GestationSnapshot> {
        match self.gestation.current_for_user(user_id).await {
            Ok(gestation) => gestation,
            Err(e) => {
                tracing::warn!("Pregnancy dates unavailable, assessing without them: {}", e);
                None
            }
        }
    }

    async fn compute_and_store(
        &self,
        profile: &HealthProfileSnapshot,
        previous: Option<&CachedAssessment>,
    ) -> RiskAssessmentResult {
        let gestation = self.load_gestation(&profile.user_id).await;
        let result = self.assembler.from_fresh(profile, gestation.as_ref()).await;

        tracing::info!(
            user_id = %profile.user_id,
            is_ai_enhanced = result.is_ai_enhanced,
            "Computed fresh risk assessment"
        );

        let row = CachedAssessment::record(
            profile.user_id.clone(),
            profile.id,
            &result,
            ContentHasher::hash(profile),
            previous,
        );
        match self.cache.upsert(&row).await {
            Ok(stored) => tracing::info!(assessment_id = %stored.id, "Cached risk assessment"),
            Err(e) => tracing::warn!("Failed to cache risk assessment: {}", e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIEnhancementClient, MockOutcome};
    use crate::adapters::memory::{InMemoryAssessmentCacheStore, InMemoryHealthProfileStore};
    use crate::application::handlers::risk_assessment::{
        AIAugmentationOrchestrator, EnhancementConfig,
    };
    use crate::domain::foundation::ErrorCode;
    use crate::domain::health::fixtures::baseline_profile;
    use crate::domain::health::ContentHash;
    use crate::ports::AIError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::time::Duration;

    struct Harness {
        service: RiskAssessmentService,
        client: MockAIEnhancementClient,
        profiles: Arc<InMemoryHealthProfileStore>,
        cache: Arc<InMemoryAssessmentCacheStore>,
    }

    fn harness_with(
        client: MockAIEnhancementClient,
        profiles: InMemoryHealthProfileStore,
        cache: InMemoryAssessmentCacheStore,
    ) -> Harness {
        let profiles = Arc::new(profiles);
        let cache = Arc::new(cache);
        let orchestrator = AIAugmentationOrchestrator::new(
            Arc::new(client.clone()),
            EnhancementConfig {
                timeout: Duration::from_millis(50),
                ..EnhancementConfig::default()
            },
        );
        let service = RiskAssessmentService::new(
            profiles.clone(),
            profiles.clone(),
            cache.clone(),
            AssessmentAssembler::new(orchestrator),
        );
        Harness {
            service,
            client,
            profiles,
            cache,
        }
    }

    fn harness() -> Harness {
        harness_with(
            MockAIEnhancementClient::new(),
            InMemoryHealthProfileStore::new(),
            InMemoryAssessmentCacheStore::new(),
        )
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let h = harness();
        let err = h.service.get_or_compute(&user()).await.unwrap_err();
        assert!(matches!(err, RiskAssessmentError::ProfileNotFound { .. }));

        let err = h.service.force_refresh(&user()).await.unwrap_err();
        assert!(matches!(err, RiskAssessmentError::ProfileNotFound { .. }));
        assert_eq!(h.client.calls().probes, 0);
    }

    #[tokio::test]
    async fn first_request_computes_and_caches() {
        let h = harness();
        h.profiles.put_profile(baseline_profile()).unwrap();

        let result = h.service.get_or_compute(&user()).await.unwrap();

        assert!(result.is_ai_enhanced);
        assert_eq!(h.cache.len(), 1);
        assert_eq!(h.cache.write_attempts(), 1);
        assert_eq!(h.client.calls().generation_calls(), 2);
    }

    #[tokio::test]
    async fn unchanged_profile_is_served_from_cache() {
        let h = harness();
        h.profiles.put_profile(baseline_profile()).unwrap();

        let first = h.service.get_or_compute(&user()).await.unwrap();
        h.client.clear_calls();
        let second = h.service.get_or_compute(&user()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.client.calls().probes, 0);
        assert_eq!(h.client.calls().generation_calls(), 0);
        assert_eq!(h.cache.write_attempts(), 1);
    }

    #[tokio::test]
    async fn changed_profile_recomputes_into_same_row() {
        let h = harness();
        let profile = baseline_profile();
        h.profiles.put_profile(profile.clone()).unwrap();
        h.service.get_or_compute(&user()).await.unwrap();
        let original = h.cache.lookup(&user(), &profile.id).await.unwrap().unwrap();

        h.profiles
            .put_profile(HealthProfileSnapshot {
                is_smoking: true,
                ..profile.clone()
            })
            .unwrap();
        h.client.clear_calls();
        let result = h.service.get_or_compute(&user()).await.unwrap();

        assert_eq!(result.medical_risks[0].risk_type, "吸烟");
        assert_eq!(h.client.calls().generation_calls(), 2);
        assert_eq!(h.cache.len(), 1);

        let updated = h.cache.lookup(&user(), &profile.id).await.unwrap().unwrap();
        assert_eq!(updated.id, original.id);
        assert_ne!(updated.health_data_hash, original.health_data_hash);
    }

    #[tokio::test]
    async fn force_refresh_always_calls_ai() {
        let h = harness();
        h.profiles.put_profile(baseline_profile()).unwrap();
        h.service.get_or_compute(&user()).await.unwrap();
        h.client.clear_calls();

        h.service.force_refresh(&user()).await.unwrap();

        assert_eq!(h.client.calls().probes, 1);
        assert_eq!(h.client.calls().generation_calls(), 2);
        assert_eq!(h.cache.write_attempts(), 2);
        assert_eq!(h.cache.len(), 1);
    }

    #[tokio::test]
    async fn refresh_replaces_non_enhanced_cache_entry() {
        let h = harness_with(
            MockAIEnhancementClient::new()
                .with_analysis(MockOutcome::Fail(AIError::network("reset"))),
            InMemoryHealthProfileStore::new(),
            InMemoryAssessmentCacheStore::new(),
        );
        h.profiles.put_profile(baseline_profile()).unwrap();

        let degraded = h.service.get_or_compute(&user()).await.unwrap();
        assert!(!degraded.is_ai_enhanced);

        let refreshed = h.service.force_refresh(&user()).await.unwrap();
        assert!(refreshed.is_ai_enhanced);

        let cached = h.service.get_or_compute(&user()).await.unwrap();
        assert!(cached.is_ai_enhanced);
    }

    #[tokio::test]
    async fn failed_write_still_returns_result() {
        let h = harness_with(
            MockAIEnhancementClient::new(),
            InMemoryHealthProfileStore::new(),
            InMemoryAssessmentCacheStore::new().with_failing_writes(),
        );
        h.profiles.put_profile(baseline_profile()).unwrap();

        let result = h.service.get_or_compute(&user()).await.unwrap();

        assert!(result.is_ai_enhanced);
        assert_eq!(h.cache.write_attempts(), 1);
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn failed_lookup_is_treated_as_miss() {
        let h = harness_with(
            MockAIEnhancementClient::new(),
            InMemoryHealthProfileStore::new(),
            InMemoryAssessmentCacheStore::new().with_failing_reads(),
        );
        h.profiles.put_profile(baseline_profile()).unwrap();

        let result = h.service.get_or_compute(&user()).await.unwrap();

        assert!(result.is_ai_enhanced);
        assert_eq!(h.cache.write_attempts(), 1);
    }

    #[tokio::test]
    async fn refresh_with_failed_lookup_still_computes_and_writes() {
        let h = harness_with(
            MockAIEnhancementClient::new(),
            InMemoryHealthProfileStore::new(),
            InMemoryAssessmentCacheStore::new().with_failing_reads(),
        );
        h.profiles.put_profile(baseline_profile()).unwrap();

        let result = h.service.force_refresh(&user()).await.unwrap();

        assert!(result.is_ai_enhanced);
        assert_eq!(h.client.calls().generation_calls(), 2);
        assert_eq!(h.cache.write_attempts(), 1);
        assert_eq!(h.cache.len(), 1);
    }

    #[tokio::test]
    async fn stale_hash_is_recomputed() {
        let h = harness();
        let profile = baseline_profile();
        h.profiles.put_profile(profile.clone()).unwrap();
        h.service.get_or_compute(&user()).await.unwrap();

        let mut row = h.cache.lookup(&user(), &profile.id).await.unwrap().unwrap();
        row.health_data_hash = ContentHash::from_stored("0000");
        h.cache.seed(row).unwrap();
        h.client.clear_calls();

        h.service.get_or_compute(&user()).await.unwrap();

        assert_eq!(h.client.calls().generation_calls(), 2);
        let stored = h.cache.lookup(&user(), &profile.id).await.unwrap().unwrap();
        assert_eq!(stored.health_data_hash, ContentHasher::hash(&profile));
    }

    #[tokio::test]
    async fn unavailable_gestation_does_not_fail_request() {
        let h = harness_with(
            MockAIEnhancementClient::new(),
            InMemoryHealthProfileStore::new().with_gestation_unavailable(),
            InMemoryAssessmentCacheStore::new(),
        );
        h.profiles.put_profile(baseline_profile()).unwrap();

        assert!(h.service.get_or_compute(&user()).await.is_ok());
    }

    #[tokio::test]
    async fn gestation_does_not_change_cache_key() {
        let h = harness();
        h.profiles.put_profile(baseline_profile()).unwrap();
        h.service.get_or_compute(&user()).await.unwrap();

        h.profiles
            .put_gestation(
                user(),
                GestationSnapshot {
                    lmp_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    due_date: NaiveDate::from_ymd_opt(2024, 10, 7).unwrap(),
                },
            )
            .unwrap();
        h.client.clear_calls();
        h.service.get_or_compute(&user()).await.unwrap();

        assert_eq!(h.client.calls().generation_calls(), 0);
    }

    struct BrokenProfiles;

    #[async_trait]
    impl HealthProfileReader for BrokenProfiles {
        async fn find_by_user(
            &self,
            _user_id: &UserId,
        ) -> Result<Option<HealthProfileSnapshot>, DomainError> {
            Err(DomainError::database("load health profile", "connection reset"))
        }
    }

    #[tokio::test]
    async fn profile_read_failure_is_infrastructure_error() {
        let gestation = Arc::new(InMemoryHealthProfileStore::new());
        let orchestrator = AIAugmentationOrchestrator::new(
            Arc::new(MockAIEnhancementClient::new()),
            EnhancementConfig::default(),
        );
        let service = RiskAssessmentService::new(
            Arc::new(BrokenProfiles),
            gestation,
            Arc::new(InMemoryAssessmentCacheStore::new()),
            AssessmentAssembler::new(orchestrator),
        );

        let err = service.get_or_compute(&user()).await.unwrap_err();
        match err {
            RiskAssessmentError::Infrastructure(e) => assert_eq!(e.code, ErrorCode::DatabaseError),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
