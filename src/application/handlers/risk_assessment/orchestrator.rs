//! AIAugmentationOrchestrator - bounded, soft-failing AI enhancement.
//!
//! Decides whether to call the AI service, races each call against a
//! timeout, and reports which parts came back. Nothing here ever fails
//! the surrounding request: every problem degrades to "no AI content".

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::health::{
    derive_risk_factors, GestationSnapshot, HealthProfileSnapshot, HealthRiskAnalysis,
    PersonalizedRecommendations,
};
use crate::ports::{AIEnhancementClient, AIError, AiResponse};

/// How the two generation calls are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhancementMode {
    /// Both calls in flight together; total latency is bounded by one timeout.
    #[default]
    Concurrent,
    /// Analysis first, then recommendations; each call gets its own timeout.
    Sequential,
}

/// Orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhancementConfig {
    /// Bound on each individual generation call.
    pub timeout: Duration,
    pub mode: EnhancementMode,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            mode: EnhancementMode::Concurrent,
        }
    }
}

/// What the AI contributed to one assessment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiEnhancement {
    pub ai_analysis: Option<HealthRiskAnalysis>,
    pub personalized_recommendations: Option<PersonalizedRecommendations>,
    /// True only when the analysis call produced a payload.
    pub is_ai_enhanced: bool,
}

pub struct AIAugmentationOrchestrator {
    client: Arc<dyn AIEnhancementClient>,
    config: EnhancementConfig,
}

impl AIAugmentationOrchestrator {
    pub fn new(client: Arc<dyn AIEnhancementClient>, config: EnhancementConfig) -> Self {
        Self { client, config }
    }

    /// Asks the AI service for an analysis and a care plan.
    ///
    /// Returns an empty enhancement when the service is unavailable.
    pub async fn enhance(
        &self,
        profile: &HealthProfileSnapshot,
        gestation: Option<&GestationSnapshot>,
    ) -> AiEnhancement {
        match self.client.is_available().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("AI service unavailable, returning rule-based assessment only");
                return AiEnhancement::default();
            }
            Err(e) => {
                tracing::warn!("AI availability probe failed: {}", e);
                return AiEnhancement::default();
            }
        }

        let risk_factors = derive_risk_factors(profile);
        let analysis = self.bounded(
            "health risk analysis",
            self.client.generate_analysis(profile, gestation),
        );
        let recommendations = self.bounded(
            "personalized recommendations",
            self.client
                .generate_recommendations(profile, gestation, &risk_factors),
        );

        let (ai_analysis, personalized_recommendations) = match self.config.mode {
            EnhancementMode::Concurrent => futures::future::join(analysis, recommendations).await,
            EnhancementMode::Sequential => {
                let analysis = analysis.await;
                (analysis, recommendations.await)
            }
        };

        let is_ai_enhanced = ai_analysis.is_some();
        AiEnhancement {
            ai_analysis,
            personalized_recommendations,
            is_ai_enhanced,
        }
    }

    /// Races `call` against the configured timeout.
    ///
    /// On timeout the call future is dropped, which cancels the request.
    async fn bounded<T>(
        &self,
        what: &str,
        call: impl Future<Output = Result<AiResponse<T>, AIError>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.config.timeout, call).await {
            Ok(Ok(response)) => {
                let message = response.message.clone();
                let data = response.into_data();
                if data.is_none() {
                    tracing::warn!(
                        "AI {} unsuccessful: {}",
                        what,
                        message.as_deref().unwrap_or("no payload")
                    );
                }
                data
            }
            Ok(Err(e)) => {
                tracing::warn!("AI {} failed: {}", what, e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "AI {} timed out after {}ms",
                    what,
                    self.config.timeout.as_millis()
                );
                None
            }
        }
    }
}
