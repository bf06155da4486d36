//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresAssessmentCacheStore` - Cached assessments with atomic upsert
//! - `PostgresHealthProfileReader` - Read-only health profile and pregnancy dates

mod assessment_cache_store;
mod health_profile_reader;

pub use assessment_cache_store::PostgresAssessmentCacheStore;
pub use health_profile_reader::PostgresHealthProfileReader;
