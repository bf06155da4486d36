//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure.

pub mod risk_assessment;

// Re-export key types for convenience
pub use risk_assessment::risk_assessment_router;
pub use risk_assessment::RiskAssessmentAppState;
