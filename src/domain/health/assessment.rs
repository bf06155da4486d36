//! Assessment result contract, AI payloads, and the persisted cache row.

use serde::{Deserialize, Deserializer, Serialize};

use super::rule_assessor::{MedicalRisk, Recommendation, StableClassification};
use super::ContentHash;
use crate::domain::foundation::{AssessmentId, HealthProfileId, Timestamp, UserId};

// ════════════════════════════════════════════════════════════════════════════
// AI payloads
// ════════════════════════════════════════════════════════════════════════════

/// AI-generated analysis of the overall health risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRiskAnalysis {
    pub overall_assessment: String,
    /// 1 (lowest) to 10 (highest).
    #[serde(deserialize_with = "lenient_risk_score")]
    pub risk_score: u8,
    pub risk_level: String,
    #[serde(default)]
    pub detailed_analyses: Vec<DetailedAnalysis>,
    pub comprehensive_recommendation: String,
}

impl HealthRiskAnalysis {
    pub const MIN_RISK_SCORE: u8 = 1;
    pub const MAX_RISK_SCORE: u8 = 10;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
}

/// Accepts any number (or numeric string) and rounds it into 1..=10.
fn lenient_risk_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match RawScore::deserialize(deserializer)? {
        RawScore::Number(n) => n,
        RawScore::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            serde::de::Error::custom(format!("riskScore is not a number: {:?}", s))
        })?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("riskScore is not finite"));
    }

    let min = f64::from(HealthRiskAnalysis::MIN_RISK_SCORE);
    let max = f64::from(HealthRiskAnalysis::MAX_RISK_SCORE);
    Ok(value.round().clamp(min, max) as u8)
}

/// One risk dimension inside a [`HealthRiskAnalysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub category: String,
    pub analysis: String,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// AI-generated personalised care plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedRecommendations {
    #[serde(default)]
    pub category_recommendations: Vec<CategoryRecommendation>,
    pub diet_plan: String,
    pub exercise_plan: String,
    pub lifestyle_adjustments: String,
    pub monitoring_advice: String,
    #[serde(default)]
    pub warning_signs_to_watch: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecommendation {
    pub category: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub priority: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Result contract
// ════════════════════════════════════════════════════════════════════════════

/// What a caller receives. Never persisted as its own row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentResult {
    pub bmi_category: String,
    pub bmi_risk: String,
    pub age_risk: String,
    pub medical_risks: Vec<MedicalRisk>,
    pub recommendations: Vec<Recommendation>,
    pub ai_analysis: Option<HealthRiskAnalysis>,
    pub personalized_recommendations: Option<PersonalizedRecommendations>,
    pub is_ai_enhanced: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Cache row
// ════════════════════════════════════════════════════════════════════════════

/// One persisted assessment per (user, health profile).
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAssessment {
    pub id: AssessmentId,
    pub user_id: UserId,
    pub health_profile_id: HealthProfileId,
    pub bmi_category: String,
    pub bmi_risk: String,
    pub age_risk: String,
    pub ai_analysis_json: Option<serde_json::Value>,
    pub personalized_recommendations_json: Option<serde_json::Value>,
    pub is_ai_enhanced: bool,
    pub health_data_hash: ContentHash,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CachedAssessment {
    /// Builds the row to upsert after a fresh computation.
    ///
    /// When `previous` is given its id and creation time are kept.
    pub fn record(
        user_id: UserId,
        health_profile_id: HealthProfileId,
        result: &RiskAssessmentResult,
        health_data_hash: ContentHash,
        previous: Option<&CachedAssessment>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: previous.map(|p| p.id).unwrap_or_default(),
            user_id,
            health_profile_id,
            bmi_category: result.bmi_category.clone(),
            bmi_risk: result.bmi_risk.clone(),
            age_risk: result.age_risk.clone(),
            // Plain data structs: to_value cannot fail for these.
            ai_analysis_json: result
                .ai_analysis
                .as_ref()
                .and_then(|a| serde_json::to_value(a).ok()),
            personalized_recommendations_json: result
                .personalized_recommendations
                .as_ref()
                .and_then(|r| serde_json::to_value(r).ok()),
            is_ai_enhanced: result.is_ai_enhanced,
            health_data_hash,
            created_at: previous.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
        }
    }

    /// Whether this row was computed from data hashing to `hash`.
    pub fn is_fresh_for(&self, hash: &ContentHash) -> bool {
        &self.health_data_hash == hash
    }

    pub fn classification(&self) -> StableClassification {
        StableClassification {
            bmi_category: self.bmi_category.clone(),
            bmi_risk: self.bmi_risk.clone(),
            age_risk: self.age_risk.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_analysis() -> HealthRiskAnalysis {
        HealthRiskAnalysis {
            overall_assessment: "整体风险中等".to_string(),
            risk_score: 6,
            risk_level: "中".to_string(),
            detailed_analyses: vec![DetailedAnalysis {
                category: "生活方式".to_string(),
                analysis: "吸烟显著增加不良妊娠结局风险".to_string(),
                risk_level: "高".to_string(),
                suggestions: vec!["立即戒烟".to_string()],
            }],
            comprehensive_recommendation: "戒烟并加强产检".to_string(),
        }
    }

    pub fn sample_recommendations() -> PersonalizedRecommendations {
        PersonalizedRecommendations {
            category_recommendations: vec![CategoryRecommendation {
                category: "饮食".to_string(),
                recommendations: vec!["增加叶酸摄入".to_string()],
                priority: "高".to_string(),
            }],
            diet_plan: "均衡饮食，少食多餐".to_string(),
            exercise_plan: "每天散步30分钟".to_string(),
            lifestyle_adjustments: "规律作息".to_string(),
            monitoring_advice: "每周测量血压".to_string(),
            warning_signs_to_watch: vec!["阴道出血".to_string(), "剧烈头痛".to_string()],
        }
    }
}
