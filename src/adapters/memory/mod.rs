//! In-memory adapters.
//!
//! Thread-safe implementations of the storage ports for development,
//! tests, and single-process demos. Nothing survives a restart.

mod assessment_cache_store;
mod health_profile_store;

pub use assessment_cache_store::InMemoryAssessmentCacheStore;
pub use health_profile_store::InMemoryHealthProfileStore;

use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::{DomainError, ErrorCode};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::new(ErrorCode::InternalError, "In-memory store lock poisoned"))
}
