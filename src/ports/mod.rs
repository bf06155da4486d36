//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `HealthProfileReader` / `GestationProvider` - read-only profile data
//! - `AssessmentCacheStore` - one cached assessment per (user, profile)
//! - `AIEnhancementClient` - the external AI analysis service

mod ai_enhancement;
mod assessment_cache_store;
mod health_profile_reader;

pub use ai_enhancement::{AIEnhancementClient, AIError, AiResponse};
pub use assessment_cache_store::AssessmentCacheStore;
pub use health_profile_reader::{GestationProvider, HealthProfileReader};
