//! AssessmentAssembler - builds the caller-facing result.
//!
//! Two paths:
//! - `from_fresh` runs the rules on the live profile and asks the AI
//! - `from_cache` reuses the stored classification and AI payloads, then
//!   rebuilds medical risks and recommendations from the live profile

use serde::de::DeserializeOwned;

use super::orchestrator::AIAugmentationOrchestrator;
use crate::domain::health::{
    CachedAssessment, GestationSnapshot, HealthProfileSnapshot, HealthRiskAnalysis,
    PersonalizedRecommendations, RiskAssessmentResult, RuleBasedAssessor,
};

pub struct AssessmentAssembler {
    orchestrator: AIAugmentationOrchestrator,
}

impl AssessmentAssembler {
    pub fn new(orchestrator: AIAugmentationOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Computes a full assessment, calling the AI service.
    pub async fn from_fresh(
        &self,
        profile: &HealthProfileSnapshot,
        gestation: Option<&GestationSnapshot>,
    ) -> RiskAssessmentResult {
        let rules = RuleBasedAssessor::assess(profile);
        let ai = self.orchestrator.enhance(profile, gestation).await;

        tracing::debug!(
            bmi = rules.bmi,
            medical_risks = rules.medical_risks.len(),
            is_ai_enhanced = ai.is_ai_enhanced,
            "Assembled fresh risk assessment"
        );

        RiskAssessmentResult {
            bmi_category: rules.classification.bmi_category,
            bmi_risk: rules.classification.bmi_risk,
            age_risk: rules.classification.age_risk,
            medical_risks: rules.medical_risks,
            recommendations: rules.recommendations,
            ai_analysis: ai.ai_analysis,
            personalized_recommendations: ai.personalized_recommendations,
            is_ai_enhanced: ai.is_ai_enhanced,
        }
    }

    /// Rebuilds an assessment from a cache row without calling the AI.
    ///
    /// Classification and the AI flag come from the row verbatim. Stored AI
    /// payloads that no longer deserialize are dropped.
    pub fn from_cache(
        &self,
        cached: &CachedAssessment,
        profile: &HealthProfileSnapshot,
    ) -> RiskAssessmentResult {
        let classification = cached.classification();
        let medical_risks = RuleBasedAssessor::medical_risks(profile);
        let recommendations =
            RuleBasedAssessor::recommendations(profile, &medical_risks, &classification);

        RiskAssessmentResult {
            bmi_category: classification.bmi_category,
            bmi_risk: classification.bmi_risk,
            age_risk: classification.age_risk,
            medical_risks,
            recommendations,
            ai_analysis: decode::<HealthRiskAnalysis>(
                cached.ai_analysis_json.as_ref(),
                "AI analysis",
            ),
            personalized_recommendations: decode::<PersonalizedRecommendations>(
                cached.personalized_recommendations_json.as_ref(),
                "personalized recommendations",
            ),
            is_ai_enhanced: cached.is_ai_enhanced,
        }
    }
}

fn decode<T: DeserializeOwned>(value: Option<&serde_json::Value>, what: &str) -> Option<T> {
    let value = value?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!("Discarding unreadable cached {}: {}", what, e);
            None
        }
    }
}
