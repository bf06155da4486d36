//! Risk-factor labels handed to the AI recommendation call.

use super::HealthProfileSnapshot;

/// Short labels describing what puts this pregnancy at risk.
///
/// Derived from the live profile on every call, in fixed order.
pub fn derive_risk_factors(profile: &HealthProfileSnapshot) -> Vec<String> {
    let bmi = profile.bmi();
    let mut factors: Vec<&str> = Vec::new();

    if bmi < 18.5 {
        factors.push("体重偏轻");
    } else if (25.0..30.0).contains(&bmi) {
        factors.push("超重");
    } else if bmi >= 30.0 {
        factors.push("肥胖");
    }

    if profile.age >= 35 {
        factors.push("高龄产妇");
    } else if profile.age < 20 {
        factors.push("年龄偏小");
    }

    if profile.is_smoking {
        factors.push("吸烟");
    }
    if profile.is_drinking {
        factors.push("饮酒");
    }
    if profile.has_medical_history() {
        factors.push("个人病史");
    }
    if profile.has_family_history() {
        factors.push("家族病史");
    }
    if profile.has_allergies_history() {
        factors.push("过敏史");
    }
    if profile.has_obstetric_history() {
        factors.push("既往孕产史");
    }

    factors.into_iter().map(String::from).collect()
}
