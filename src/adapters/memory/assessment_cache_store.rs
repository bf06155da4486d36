//! In-memory implementation of AssessmentCacheStore.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::lock;
use crate::domain::foundation::{DomainError, HealthProfileId, UserId};
use crate::domain::health::CachedAssessment;
use crate::ports::AssessmentCacheStore;

type Key = (UserId, HealthProfileId);

/// In-memory cache store keyed by `(user_id, health_profile_id)`.
///
/// The whole upsert runs under one lock, so it is atomic like the
/// database `ON CONFLICT` version. Reads and writes can be made to fail
/// for exercising the degraded paths.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryAssessmentCacheStore::new().with_failing_writes();
/// assert!(store.upsert(&row).await.is_err());
/// assert_eq!(store.write_attempts(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryAssessmentCacheStore {
    rows: Mutex<HashMap<Key, CachedAssessment>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_attempts: AtomicUsize,
}

impl InMemoryAssessmentCacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `lookup` fails with a database error.
    pub fn with_failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Every `upsert` fails with a database error.
    pub fn with_failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Number of `upsert` calls, failed ones included.
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Directly replaces a row, bypassing upsert bookkeeping.
    ///
    /// Useful for seeding stale or corrupt cache entries in tests.
    pub fn seed(&self, row: CachedAssessment) -> Result<(), DomainError> {
        let key = (row.user_id.clone(), row.health_profile_id);
        lock(&self.rows)?.insert(key, row);
        Ok(())
    }
}

#[async_trait]
impl AssessmentCacheStore for InMemoryAssessmentCacheStore {
    async fn lookup(
        &self,
        user_id: &UserId,
        health_profile_id: &HealthProfileId,
    ) -> Result<Option<CachedAssessment>, DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::database("look up cached assessment", "simulated failure"));
        }

        let rows = lock(&self.rows)?;
        Ok(rows.get(&(user_id.clone(), *health_profile_id)).cloned())
    }

    async fn upsert(&self, entry: &CachedAssessment) -> Result<CachedAssessment, DomainError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("upsert cached assessment", "simulated failure"));
        }

        let mut rows = lock(&self.rows)?;
        let key = (entry.user_id.clone(), entry.health_profile_id);

        let stored = match rows.get(&key) {
            Some(existing) => CachedAssessment {
                id: existing.id,
                created_at: existing.created_at,
                ..entry.clone()
            },
            None => entry.clone(),
        };

        rows.insert(key, stored.clone());
        Ok(stored)
    }
}
