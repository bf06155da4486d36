//! Read-only ports onto the profile subsystem.
//!
//! The assessment engine never writes health profiles or pregnancy dates.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::health::{GestationSnapshot, HealthProfileSnapshot};

/// Query access to the caller's health profile.
#[async_trait]
pub trait HealthProfileReader: Send + Sync {
    /// The user's current health profile, if one exists.
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<HealthProfileSnapshot>, DomainError>;
}

/// Query access to pregnancy dates.
///
/// `None` is a valid answer: dates are only known once confirmed.
#[async_trait]
pub trait GestationProvider: Send + Sync {
    async fn current_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GestationSnapshot>, DomainError>;
}
