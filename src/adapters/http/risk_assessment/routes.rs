//! Route configuration for risk assessment endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{get_risk_assessment, refresh_risk_assessment, RiskAssessmentAppState};

/// Creates the risk assessment router.
///
/// Routes:
/// - `GET /health-profiles/risk-assessment` - Cached or fresh assessment
/// - `POST /health-profiles/risk-assessment/refresh` - Recompute and re-cache
pub fn risk_assessment_router() -> Router<RiskAssessmentAppState> {
    Router::new()
        .route("/health-profiles/risk-assessment", get(get_risk_assessment))
        .route(
            "/health-profiles/risk-assessment/refresh",
            post(refresh_risk_assessment),
        )
}
