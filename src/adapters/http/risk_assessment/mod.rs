//! HTTP adapter for risk assessment.
//!
//! # Endpoints
//!
//! - `GET /health-profiles/risk-assessment` - Cached or freshly computed assessment
//! - `POST /health-profiles/risk-assessment/refresh` - Forced recomputation

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::RiskAssessmentAppState;
pub use routes::risk_assessment_router;
