//! Content hash over the risk-relevant subset of a health profile.
//!
//! The cache row stores this fingerprint; a mismatch with the live profile
//! means the cached assessment is stale. The canonical form is compact JSON
//! with a fixed key order and explicit `null` for absent histories, so any
//! implementation serialising the same tuple the same way gets the same hash.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::HealthProfileSnapshot;

/// Uppercase hex SHA-256 digest of the canonical health data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wraps a previously stored hash.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field order here is the canonical order. Do not reorder.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalHealthData<'a> {
    height: f64,
    pre_pregnancy_weight: f64,
    current_weight: f64,
    blood_type: &'a str,
    age: u32,
    medical_history: Option<&'a str>,
    family_history: Option<&'a str>,
    allergies_history: Option<&'a str>,
    obstetric_history: Option<&'a str>,
    is_smoking: bool,
    is_drinking: bool,
}

impl<'a> From<&'a HealthProfileSnapshot> for CanonicalHealthData<'a> {
    fn from(profile: &'a HealthProfileSnapshot) -> Self {
        Self {
            height: profile.height,
            pre_pregnancy_weight: profile.pre_pregnancy_weight,
            current_weight: profile.current_weight,
            blood_type: &profile.blood_type,
            age: profile.age,
            medical_history: profile.medical_history.as_deref(),
            family_history: profile.family_history.as_deref(),
            allergies_history: profile.allergies_history.as_deref(),
            obstetric_history: profile.obstetric_history.as_deref(),
            is_smoking: profile.is_smoking,
            is_drinking: profile.is_drinking,
        }
    }
}

/// Computes [`ContentHash`] values. Pure, no I/O.
pub struct ContentHasher;

impl ContentHasher {
    /// Hashes the risk-relevant fields of `profile`.
    pub fn hash(profile: &HealthProfileSnapshot) -> ContentHash {
        let canonical = Self::canonical_form(profile);
        let digest = Sha256::digest(canonical.as_bytes());
        ContentHash(format!("{:X}", digest))
    }

    /// The exact string that gets digested.
    pub fn canonical_form(profile: &HealthProfileSnapshot) -> String {
        let data = CanonicalHealthData::from(profile);
        // Serializing a struct of plain scalars and strings cannot fail.
        serde_json::to_string(&data).unwrap_or_default()
    }
}
