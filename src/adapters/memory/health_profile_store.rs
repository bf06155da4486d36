//! In-memory health profile and pregnancy-date source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::health::{GestationSnapshot, HealthProfileSnapshot};
use crate::ports::{GestationProvider, HealthProfileReader};

/// Implements both profile read ports from in-process maps.
///
/// Profiles and pregnancy dates are written directly by tests or demo
/// bootstrapping; the assessment engine only reads them.
#[derive(Default)]
pub struct InMemoryHealthProfileStore {
    profiles: Mutex<HashMap<UserId, HealthProfileSnapshot>>,
    gestations: Mutex<HashMap<UserId, GestationSnapshot>>,
    gestation_unavailable: bool,
}

impl InMemoryHealthProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pregnancy-date lookups fail with a database error.
    pub fn with_gestation_unavailable(mut self) -> Self {
        self.gestation_unavailable = true;
        self
    }

    /// Stores or replaces the profile for its user.
    pub fn put_profile(&self, profile: HealthProfileSnapshot) -> Result<(), DomainError> {
        lock(&self.profiles)?.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    /// Stores or replaces the pregnancy dates for a user.
    pub fn put_gestation(
        &self,
        user_id: UserId,
        gestation: GestationSnapshot,
    ) -> Result<(), DomainError> {
        lock(&self.gestations)?.insert(user_id, gestation);
        Ok(())
    }
}

#[async_trait]
impl HealthProfileReader for InMemoryHealthProfileStore {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<HealthProfileSnapshot>, DomainError> {
        Ok(lock(&self.profiles)?.get(user_id).cloned())
    }
}

#[async_trait]
impl GestationProvider for InMemoryHealthProfileStore {
    async fn current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GestationSnapshot>, DomainError> {
        if self.gestation_unavailable {
            return Err(DomainError::database("load pregnancy dates", "simulated failure"));
        }
        Ok(lock(&self.gestations)?.get(user_id).copied())
    }
}
