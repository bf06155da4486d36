//! RuleBasedAssessor - deterministic BMI / age / lifestyle / history risk rules.
//!
//! Output is a pure function of the input: no clock, no randomness, no I/O.
//!
//! The assessment is split in two halves so the cache path can reuse it:
//! the *stable classification* (BMI category, BMI risk text, age risk text)
//! and the *risk lists* (medical risks and recommendations). On a cache hit
//! the stable half comes from the cached row while the lists are rebuilt from
//! the live profile via [`RuleBasedAssessor::medical_risks`] and
//! [`RuleBasedAssessor::recommendations`].

use serde::{Deserialize, Serialize};

use super::HealthProfileSnapshot;

/// Age at or above which a pregnancy is treated as advanced maternal age.
pub const ADVANCED_MATERNAL_AGE: u32 = 35;

// ════════════════════════════════════════════════════════════════════════════
// Classification enums
// ════════════════════════════════════════════════════════════════════════════

/// Pre-pregnancy BMI bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Classifies a BMI value. Lower bounds are inclusive.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    /// Parses a stored label back into a category.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "偏瘦" => Some(BmiCategory::Underweight),
            "正常" => Some(BmiCategory::Normal),
            "超重" => Some(BmiCategory::Overweight),
            "肥胖" => Some(BmiCategory::Obese),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "偏瘦",
            BmiCategory::Normal => "正常",
            BmiCategory::Overweight => "超重",
            BmiCategory::Obese => "肥胖",
        }
    }

    pub fn risk_text(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => {
                "孕前体重偏轻，可能增加胎儿生长受限和早产风险，孕期需适当增加营养摄入，保证体重合理增长"
            }
            BmiCategory::Normal => "孕前体重处于正常范围，继续保持均衡饮食和适量运动",
            BmiCategory::Overweight => {
                "孕前超重，妊娠期糖尿病和妊娠期高血压风险增加，孕期需控制体重增长速度"
            }
            BmiCategory::Obese => {
                "孕前肥胖，妊娠期糖尿病、妊娠期高血压及巨大儿风险显著增加，需在医生指导下严格管理体重"
            }
        }
    }

    /// Categories that do not by themselves call for caution.
    fn is_reassuring_label(label: &str) -> bool {
        matches!(
            Self::from_label(label),
            Some(BmiCategory::Normal) | Some(BmiCategory::Underweight)
        )
    }
}

/// Age-based risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeRisk {
    Normal,
    AdvancedMaternalAge,
}

impl AgeRisk {
    pub fn from_age(age: u32) -> Self {
        if age >= ADVANCED_MATERNAL_AGE {
            AgeRisk::AdvancedMaternalAge
        } else {
            AgeRisk::Normal
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            AgeRisk::Normal => "年龄处于适宜生育范围，年龄相关风险较低",
            AgeRisk::AdvancedMaternalAge => {
                "高龄产妇，妊娠期高血压、妊娠期糖尿病及胎儿染色体异常风险增加，需定期监测血压和血糖"
            }
        }
    }
}

/// Severity of an individual medical risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "低")]
    Low,
    #[serde(rename = "中")]
    Medium,
    #[serde(rename = "高")]
    High,
}

// ════════════════════════════════════════════════════════════════════════════
// Output types
// ════════════════════════════════════════════════════════════════════════════

/// A single triggered medical risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRisk {
    #[serde(rename = "type")]
    pub risk_type: String,
    pub description: String,
    pub severity: Severity,
}

impl MedicalRisk {
    fn new(risk_type: &str, description: &str, severity: Severity) -> Self {
        Self {
            risk_type: risk_type.to_string(),
            description: description.to_string(),
            severity,
        }
    }
}

/// A single recommendation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub description: String,
}

impl Recommendation {
    fn new(category: &str, description: impl Into<String>) -> Self {
        Self {
            category: category.to_string(),
            description: description.into(),
        }
    }
}

/// The fields a cached assessment keeps verbatim across cache hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableClassification {
    pub bmi_category: String,
    pub bmi_risk: String,
    pub age_risk: String,
}

impl StableClassification {
    /// Fresh classification of a live profile.
    pub fn of(profile: &HealthProfileSnapshot) -> Self {
        let category = BmiCategory::from_bmi(profile.bmi());
        Self {
            bmi_category: category.label().to_string(),
            bmi_risk: category.risk_text().to_string(),
            age_risk: AgeRisk::from_age(profile.age).text().to_string(),
        }
    }
}

/// Full rule-based assessment of a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleAssessment {
    /// BMI rounded to one decimal, for display only.
    pub bmi: f64,
    pub classification: StableClassification,
    pub medical_risks: Vec<MedicalRisk>,
    pub recommendations: Vec<Recommendation>,
}

// ════════════════════════════════════════════════════════════════════════════
// Assessor
// ════════════════════════════════════════════════════════════════════════════

/// Category of the all-clear summary recommendation.
pub const SUMMARY_ALL_CLEAR: &str = "综合评估";
/// Category of the caution summary recommendation.
pub const SUMMARY_CAUTION: &str = "综合建议";

pub struct RuleBasedAssessor;

impl RuleBasedAssessor {
    pub fn assess(profile: &HealthProfileSnapshot) -> RuleAssessment {
        let classification = StableClassification::of(profile);
        let medical_risks = Self::medical_risks(profile);
        let recommendations = Self::recommendations(profile, &medical_risks, &classification);

        RuleAssessment {
            bmi: (profile.bmi() * 10.0).round() / 10.0,
            classification,
            medical_risks,
            recommendations,
        }
    }

    /// Medical risks triggered by the live profile, in fixed order.
    pub fn medical_risks(profile: &HealthProfileSnapshot) -> Vec<MedicalRisk> {
        let mut risks = Vec::new();

        if profile.age >= ADVANCED_MATERNAL_AGE {
            risks.push(MedicalRisk::new(
                "年龄因素",
                "年龄≥35岁，属于高龄妊娠，妊娠并发症及胎儿染色体异常风险增加",
                Severity::Medium,
            ));
        }
        if profile.has_medical_history() {
            risks.push(MedicalRisk::new(
                "既往病史",
                "存在既往病史，可能影响妊娠过程，需要专科医生评估",
                Severity::Medium,
            ));
        }
        if profile.has_family_history() {
            risks.push(MedicalRisk::new(
                "家族病史",
                "存在家族病史，部分遗传性疾病或慢性病风险可能增加",
                Severity::Medium,
            ));
        }
        if profile.is_smoking {
            risks.push(MedicalRisk::new(
                "吸烟",
                "吸烟可导致胎儿生长受限、早产、胎盘早剥等严重后果",
                Severity::High,
            ));
        }
        if profile.is_drinking {
            risks.push(MedicalRisk::new(
                "饮酒",
                "孕期饮酒可能导致胎儿酒精综合征及发育异常",
                Severity::High,
            ));
        }

        risks
    }

    /// Recommendations for the live profile.
    ///
    /// `classification` supplies the text embedded in the weight-management
    /// entry and decides the summary; on a cache hit it is the cached one.
    pub fn recommendations(
        profile: &HealthProfileSnapshot,
        medical_risks: &[MedicalRisk],
        classification: &StableClassification,
    ) -> Vec<Recommendation> {
        let mut recommendations = vec![Recommendation::new(
            "体重管理",
            format!(
                "您的孕前BMI分类为{}。{}",
                classification.bmi_category, classification.bmi_risk
            ),
        )];

        if profile.age >= ADVANCED_MATERNAL_AGE {
            recommendations.push(Recommendation::new(
                "高龄注意事项",
                "建议按时进行产前筛查和产前诊断（如无创DNA、羊水穿刺），定期监测血压、血糖",
            ));
        }
        if profile.has_medical_history() {
            recommendations.push(Recommendation::new(
                "病史管理",
                "请向产科医生详细说明既往病史，遵医嘱调整用药并定期复查",
            ));
        }
        if profile.has_family_history() {
            recommendations.push(Recommendation::new(
                "家族病史",
                "建议进行遗传咨询，必要时增加相关疾病的筛查项目",
            ));
        }
        if profile.has_allergies_history() {
            recommendations.push(Recommendation::new(
                "过敏史",
                "就医和用药时主动告知过敏史，避免接触已知过敏原",
            ));
        }
        if profile.is_smoking {
            recommendations.push(Recommendation::new(
                "戒烟建议",
                "请立即戒烟并避免二手烟暴露，必要时寻求专业戒烟帮助",
            ));
        }
        if profile.is_drinking {
            recommendations.push(Recommendation::new(
                "戒酒建议",
                "孕期没有安全的饮酒量，请完全停止饮酒",
            ));
        }

        let all_clear = medical_risks.is_empty()
            && classification.age_risk == AgeRisk::Normal.text()
            && BmiCategory::is_reassuring_label(&classification.bmi_category);

        if all_clear {
            recommendations.push(Recommendation::new(
                SUMMARY_ALL_CLEAR,
                "您目前的健康状况良好，请继续保持健康的生活方式，按时进行产检",
            ));
        } else {
            recommendations.push(Recommendation::new(
                SUMMARY_CAUTION,
                "您存在一定的妊娠风险因素，请密切关注身体变化，严格按时产检，如有不适及时就医",
            ));
        }

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::health::profile::fixtures::baseline_profile;
    use proptest::prelude::*;

    fn categories(recommendations: &[Recommendation]) -> Vec<&str> {
        recommendations.iter().map(|r| r.category.as_str()).collect()
    }

    #[test]
    fn bmi_boundary_table() {
        let table = [
            (18.49, BmiCategory::Underweight),
            (18.50, BmiCategory::Normal),
            (24.99, BmiCategory::Normal),
            (25.00, BmiCategory::Overweight),
            (29.99, BmiCategory::Overweight),
            (30.00, BmiCategory::Obese),
        ];
        for (bmi, expected) in table {
            assert_eq!(BmiCategory::from_bmi(bmi), expected, "bmi {}", bmi);
        }
    }

    #[test]
    fn bmi_boundaries_hold_through_profile_arithmetic() {
        // 200 cm gives an exact divisor of 4.0
        let at = |weight: f64| {
            let profile = HealthProfileSnapshot {
                height: 200.0,
                pre_pregnancy_weight: weight,
                ..baseline_profile()
            };
            RuleBasedAssessor::assess(&profile).classification.bmi_category
        };
        assert_eq!(at(73.9), "偏瘦");
        assert_eq!(at(74.0), "正常");
        assert_eq!(at(100.0), "超重");
        assert_eq!(at(120.0), "肥胖");
    }

    #[test]
    fn age_boundary_is_inclusive_at_35() {
        assert_eq!(AgeRisk::from_age(34), AgeRisk::Normal);
        assert_eq!(AgeRisk::from_age(35), AgeRisk::AdvancedMaternalAge);

        let at_age = |age| {
            RuleBasedAssessor::assess(&HealthProfileSnapshot {
                age,
                ..baseline_profile()
            })
        };
        let at_34 = at_age(34);
        let at_35 = at_age(35);
        assert_eq!(at_34.classification.age_risk, AgeRisk::Normal.text());
        assert_eq!(at_35.classification.age_risk, AgeRisk::AdvancedMaternalAge.text());
    }

    #[test]
    fn labels_round_trip() {
        for category in [
            BmiCategory::Underweight,
            BmiCategory::Normal,
            BmiCategory::Overweight,
            BmiCategory::Obese,
        ] {
            assert_eq!(BmiCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(BmiCategory::from_label("unknown"), None);
    }

    #[test]
    fn concrete_scenario_smoker_aged_36() {
        let profile = HealthProfileSnapshot {
            height: 165.0,
            pre_pregnancy_weight: 60.0,
            current_weight: 68.0,
            age: 36,
            is_smoking: true,
            is_drinking: false,
            medical_history: Some(String::new()),
            family_history: Some(String::new()),
            allergies_history: Some(String::new()),
            obstetric_history: Some(String::new()),
            ..baseline_profile()
        };

        let assessment = RuleBasedAssessor::assess(&profile);

        assert_eq!(assessment.bmi, 22.0);
        assert_eq!(assessment.classification.bmi_category, "正常");
        assert_eq!(assessment.classification.age_risk, AgeRisk::AdvancedMaternalAge.text());

        assert_eq!(assessment.medical_risks.len(), 2);
        assert_eq!(assessment.medical_risks[0].risk_type, "年龄因素");
        assert_eq!(assessment.medical_risks[0].severity, Severity::Medium);
        assert_eq!(assessment.medical_risks[1].risk_type, "吸烟");
        assert_eq!(assessment.medical_risks[1].severity, Severity::High);

        assert_eq!(
            categories(&assessment.recommendations),
            vec!["体重管理", "高龄注意事项", "戒烟建议", "综合建议"]
        );
    }

    #[test]
    fn healthy_profile_gets_all_clear_summary() {
        let assessment = RuleBasedAssessor::assess(&baseline_profile());
        assert!(assessment.medical_risks.is_empty());
        assert_eq!(
            categories(&assessment.recommendations),
            vec!["体重管理", "综合评估"]
        );
    }

    #[test]
    fn underweight_without_risks_is_still_all_clear() {
        let profile = HealthProfileSnapshot {
            pre_pregnancy_weight: 45.0,
            ..baseline_profile()
        };
        let assessment = RuleBasedAssessor::assess(&profile);
        assert_eq!(assessment.classification.bmi_category, "偏瘦");
        assert_eq!(assessment.recommendations.last().unwrap().category, SUMMARY_ALL_CLEAR);
    }

    #[test]
    fn overweight_without_risks_gets_caution_summary() {
        let profile = HealthProfileSnapshot {
            pre_pregnancy_weight: 75.0,
            ..baseline_profile()
        };
        let assessment = RuleBasedAssessor::assess(&profile);
        assert!(assessment.medical_risks.is_empty());
        assert_eq!(assessment.recommendations.last().unwrap().category, SUMMARY_CAUTION);
    }

    #[test]
    fn allergies_add_recommendation_but_no_medical_risk() {
        let profile = HealthProfileSnapshot {
            allergies_history: Some("青霉素过敏".to_string()),
            ..baseline_profile()
        };
        let assessment = RuleBasedAssessor::assess(&profile);
        assert!(assessment.medical_risks.is_empty());
        assert_eq!(
            categories(&assessment.recommendations),
            vec!["体重管理", "过敏史", "综合评估"]
        );
    }

    #[test]
    fn every_trigger_fires_in_order() {
        let profile = HealthProfileSnapshot {
            age: 40,
            medical_history: Some("甲状腺功能减退".to_string()),
            family_history: Some("糖尿病".to_string()),
            allergies_history: Some("海鲜".to_string()),
            is_smoking: true,
            is_drinking: true,
            ..baseline_profile()
        };
        let assessment = RuleBasedAssessor::assess(&profile);

        let risk_types: Vec<&str> = assessment
            .medical_risks
            .iter()
            .map(|r| r.risk_type.as_str())
            .collect();
        assert_eq!(risk_types, vec!["年龄因素", "既往病史", "家族病史", "吸烟", "饮酒"]);
        assert_eq!(
            categories(&assessment.recommendations),
            vec![
                "体重管理",
                "高龄注意事项",
                "病史管理",
                "家族病史",
                "过敏史",
                "戒烟建议",
                "戒酒建议",
                "综合建议"
            ]
        );
    }

    #[test]
    fn weight_recommendation_embeds_supplied_classification() {
        let classification = StableClassification {
            bmi_category: "超重".to_string(),
            bmi_risk: "cached risk text".to_string(),
            age_risk: AgeRisk::Normal.text().to_string(),
        };
        let recommendations =
            RuleBasedAssessor::recommendations(&baseline_profile(), &[], &classification);

        assert_eq!(recommendations[0].description, "您的孕前BMI分类为超重。cached risk text");
        assert_eq!(recommendations.last().unwrap().category, SUMMARY_CAUTION);
    }

    #[test]
    fn severity_serializes_as_chinese_grade() {
        assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"低\"");
        assert_eq!(serde_json::to_string(&Severity::Medium).unwrap(), "\"中\"");
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"高\"");
    }

    #[test]
    fn medical_risk_serializes_type_key() {
        let risk = MedicalRisk::new("吸烟", "desc", Severity::High);
        let json = serde_json::to_value(&risk).unwrap();
        assert_eq!(json["type"], "吸烟");
        assert_eq!(json["severity"], "高");
    }

    proptest! {
        #[test]
        fn assessment_is_idempotent_with_exactly_one_summary(
            height in 140.0f64..200.0,
            weight in 35.0f64..130.0,
            age in 16u32..50,
            smoking: bool,
            drinking: bool,
            history: bool,
        ) {
            let profile = HealthProfileSnapshot {
                height,
                pre_pregnancy_weight: weight,
                age,
                is_smoking: smoking,
                is_drinking: drinking,
                medical_history: history.then(|| "高血压".to_string()),
                ..baseline_profile()
            };

            let first = RuleBasedAssessor::assess(&profile);
            let second = RuleBasedAssessor::assess(&profile);
            prop_assert_eq!(&first, &second);

            let summaries = first
                .recommendations
                .iter()
                .filter(|r| r.category == SUMMARY_ALL_CLEAR || r.category == SUMMARY_CAUTION)
                .count();
            prop_assert_eq!(summaries, 1);
            prop_assert_eq!(first.recommendations[0].category.as_str(), "体重管理");
        }
    }
}
