//! Health risk assessment domain.
//!
//! # Module Organization
//!
//! - `profile` - Read-only snapshots of the health profile and pregnancy dates
//! - `content_hash` - Stable fingerprint of the risk-relevant profile fields
//! - `rule_assessor` - Deterministic BMI / age / lifestyle / history rules
//! - `risk_factors` - Labels passed to the AI recommendation call
//! - `assessment` - Result contract, AI payloads, persisted cache row

mod assessment;
mod content_hash;
mod profile;
mod risk_factors;
mod rule_assessor;

pub use assessment::{
    CachedAssessment, CategoryRecommendation, DetailedAnalysis, HealthRiskAnalysis,
    PersonalizedRecommendations, RiskAssessmentResult,
};
pub use content_hash::{ContentHash, ContentHasher};
pub use profile::{GestationSnapshot, GestationalAge, HealthProfileSnapshot};
pub use risk_factors::derive_risk_factors;
pub use rule_assessor::{
    AgeRisk, BmiCategory, MedicalRisk, Recommendation, RuleAssessment, RuleBasedAssessor,
    Severity, StableClassification, ADVANCED_MATERNAL_AGE, SUMMARY_ALL_CLEAR, SUMMARY_CAUTION,
};
