//! Read-only snapshots of data owned by other subsystems.
//!
//! The profile subsystem owns the health profile and the pregnancy-date
//! bookkeeping; the assessment engine only ever reads these values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{HealthProfileId, UserId};

/// A user's health profile as seen by the assessment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfileSnapshot {
    pub id: HealthProfileId,
    pub user_id: UserId,
    /// Height in centimetres.
    pub height: f64,
    /// Weight before pregnancy in kilograms.
    pub pre_pregnancy_weight: f64,
    /// Current weight in kilograms.
    pub current_weight: f64,
    pub blood_type: String,
    pub age: u32,
    pub medical_history: Option<String>,
    pub family_history: Option<String>,
    pub allergies_history: Option<String>,
    pub obstetric_history: Option<String>,
    pub is_smoking: bool,
    pub is_drinking: bool,
}

impl HealthProfileSnapshot {
    /// Pre-pregnancy body mass index, `weight / (height in metres)²`.
    pub fn bmi(&self) -> f64 {
        let height_m = self.height / 100.0;
        self.pre_pregnancy_weight / (height_m * height_m)
    }

    /// Weight gained since before pregnancy, in kilograms.
    pub fn weight_gain(&self) -> f64 {
        self.current_weight - self.pre_pregnancy_weight
    }

    pub fn has_medical_history(&self) -> bool {
        has_text(&self.medical_history)
    }

    pub fn has_family_history(&self) -> bool {
        has_text(&self.family_history)
    }

    pub fn has_allergies_history(&self) -> bool {
        has_text(&self.allergies_history)
    }

    pub fn has_obstetric_history(&self) -> bool {
        has_text(&self.obstetric_history)
    }
}

/// Whitespace-only history counts as absent.
fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Pregnancy dates, present once the user has confirmed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestationSnapshot {
    /// First day of the last menstrual period.
    pub lmp_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Completed weeks and remaining days of gestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestationalAge {
    pub weeks: u32,
    pub days: u32,
}

impl GestationSnapshot {
    /// Gestational age on `date`, counted from the LMP.
    ///
    /// Returns `None` when `date` precedes the LMP.
    pub fn gestational_age_on(&self, date: NaiveDate) -> Option<GestationalAge> {
        let elapsed = (date - self.lmp_date).num_days();
        if elapsed < 0 {
            return None;
        }
        let elapsed = u32::try_from(elapsed).ok()?;
        Some(GestationalAge {
            weeks: elapsed / 7,
            days: elapsed % 7,
        })
    }

    /// Days remaining until the due date (negative once overdue).
    pub fn days_until_due_on(&self, date: NaiveDate) -> i64 {
        (self.due_date - date).num_days()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Healthy 28-year-old with normal BMI and no history.
    pub fn baseline_profile() -> HealthProfileSnapshot {
        HealthProfileSnapshot {
            id: HealthProfileId::new(),
            user_id: UserId::new("user-1").unwrap(),
            height: 165.0,
            pre_pregnancy_weight: 55.0,
            current_weight: 60.0,
            blood_type: "A".to_string(),
            age: 28,
            medical_history: None,
            family_history: None,
            allergies_history: None,
            obstetric_history: None,
            is_smoking: false,
            is_drinking: false,
        }
    }
}
