//! AI Enhancement Port - Interface for the external health-analysis AI service.
//!
//! The service is slow and sometimes unavailable. Callers are expected to
//! bound every call in time and to treat any failure as a soft degrade.
//!
//! # Failure shapes
//!
//! A call can fail in two ways, and callers handle both the same:
//! - `Err(AIError)` - the call itself failed (network, auth, parse, ...)
//! - `Ok(AiResponse { success: false, .. })` - the service answered but
//!   declined or could not produce a payload
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct AlwaysDown;
//!
//! #[async_trait]
//! impl AIEnhancementClient for AlwaysDown {
//!     async fn is_available(&self) -> Result<bool, AIError> {
//!         Ok(false)
//!     }
//!     // ... generation methods
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::health::{
    GestationSnapshot, HealthProfileSnapshot, HealthRiskAnalysis, PersonalizedRecommendations,
};

/// Port for the AI health-analysis service.
#[async_trait]
pub trait AIEnhancementClient: Send + Sync {
    /// Cheap availability probe. No timeout is guaranteed by implementations.
    async fn is_available(&self) -> Result<bool, AIError>;

    /// Generates an overall risk analysis.
    async fn generate_analysis(
        &self,
        profile: &HealthProfileSnapshot,
        gestation: Option<&GestationSnapshot>,
    ) -> Result<AiResponse<HealthRiskAnalysis>, AIError>;

    /// Generates a personalised care plan for the given risk factors.
    async fn generate_recommendations(
        &self,
        profile: &HealthProfileSnapshot,
        gestation: Option<&GestationSnapshot>,
        risk_factors: &[String],
    ) -> Result<AiResponse<PersonalizedRecommendations>, AIError>;
}

/// Envelope returned by the AI service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> AiResponse<T> {
    /// Creates a successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Creates an unsuccessful response.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// The payload, only if the service reported success and sent one.
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

/// AI service errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },
}

impl AIError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_yields_data() {
        let response = AiResponse::ok(7);
        assert!(response.success);
        assert_eq!(response.into_data(), Some(7));
    }

    #[test]
    fn failure_response_yields_nothing() {
        let response: AiResponse<i32> = AiResponse::failure("model overloaded");
        assert_eq!(response.message.as_deref(), Some("model overloaded"));
        assert_eq!(response.into_data(), None);
    }

    #[test]
    fn unsuccessful_response_with_data_is_still_discarded() {
        let response = AiResponse {
            success: false,
            data: Some(1),
            message: None,
        };
        assert_eq!(response.into_data(), None);
    }

    #[test]
    fn successful_response_without_data_yields_nothing() {
        let response: AiResponse<i32> = AiResponse {
            success: true,
            data: None,
            message: None,
        };
        assert_eq!(response.into_data(), None);
    }

    #[test]
    fn ai_error_displays_correctly() {
        assert_eq!(
            AIError::Timeout { timeout_secs: 60 }.to_string(),
            "request timed out after 60s"
        );
        assert_eq!(
            AIError::unavailable("maintenance").to_string(),
            "provider unavailable: maintenance"
        );
    }
}
