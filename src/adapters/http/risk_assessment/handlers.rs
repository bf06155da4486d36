//! HTTP handlers for risk assessment endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{ApiResponse, RiskAssessmentResponse};
use crate::application::{RiskAssessmentError, RiskAssessmentService};
use crate::domain::foundation::UserId;

/// Shared application state.
#[derive(Clone)]
pub struct RiskAssessmentAppState {
    pub service: Arc<RiskAssessmentService>,
}

impl RiskAssessmentAppState {
    pub fn new(service: Arc<RiskAssessmentService>) -> Self {
        Self { service }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Caller identity, taken from the `X-User-Id` header set by the gateway.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let error = ApiResponse::error("Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s.trim()).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health-profiles/risk-assessment
pub async fn get_risk_assessment(
    State(state): State<RiskAssessmentAppState>,
    user: AuthenticatedUser,
) -> Result<Json<RiskAssessmentResponse>, RiskAssessmentApiError> {
    let result = state.service.get_or_compute(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /health-profiles/risk-assessment/refresh
pub async fn refresh_risk_assessment(
    State(state): State<RiskAssessmentAppState>,
    user: AuthenticatedUser,
) -> Result<Json<RiskAssessmentResponse>, RiskAssessmentApiError> {
    let result = state.service.force_refresh(&user.user_id).await?;
    Ok(Json(ApiResponse::ok_with_message(result, "Risk assessment refreshed")))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts service errors to HTTP responses.
#[derive(Debug)]
pub enum RiskAssessmentApiError {
    NotFound(String),
    Internal(String),
}

impl From<RiskAssessmentError> for RiskAssessmentApiError {
    fn from(err: RiskAssessmentError) -> Self {
        match err {
            RiskAssessmentError::ProfileNotFound { user_id } => RiskAssessmentApiError::NotFound(
                format!("Health profile not found for user {}", user_id),
            ),
            RiskAssessmentError::Infrastructure(e) => {
                RiskAssessmentApiError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for RiskAssessmentApiError {
    fn into_response(self) -> Response {
        match self {
            RiskAssessmentApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ApiResponse::error(msg))).into_response()
            }
            RiskAssessmentApiError::Internal(msg) => {
                tracing::error!("Risk assessment failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Failed to assess health risk")),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;

    #[test]
    fn profile_not_found_maps_to_404() {
        let err = RiskAssessmentError::ProfileNotFound {
            user_id: UserId::new("u").unwrap(),
        };
        let response = RiskAssessmentApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_error_maps_to_500() {
        let err = RiskAssessmentError::Infrastructure(DomainError::database(
            "fetch health profile",
            "connection reset",
        ));
        let response = RiskAssessmentApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
