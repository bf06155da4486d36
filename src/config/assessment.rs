//! Risk assessment configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::{EnhancementConfig, EnhancementMode};

/// How AI enhancement is bounded and scheduled.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentConfig {
    /// Bound on each AI generation call, in seconds
    #[serde(default = "default_enhancement_timeout")]
    pub enhancement_timeout_secs: u64,

    /// Run the analysis and recommendation calls concurrently
    #[serde(default = "default_concurrent")]
    pub concurrent_enhancement: bool,
}

impl AssessmentConfig {
    pub fn enhancement_timeout(&self) -> Duration {
        Duration::from_secs(self.enhancement_timeout_secs)
    }

    /// Orchestrator settings derived from this section.
    pub fn enhancement(&self) -> EnhancementConfig {
        EnhancementConfig {
            timeout: self.enhancement_timeout(),
            mode: if self.concurrent_enhancement {
                EnhancementMode::Concurrent
            } else {
                EnhancementMode::Sequential
            },
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=600).contains(&self.enhancement_timeout_secs) {
            return Err(ValidationError::InvalidEnhancementTimeout);
        }
        Ok(())
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            enhancement_timeout_secs: default_enhancement_timeout(),
            concurrent_enhancement: default_concurrent(),
        }
    }
}

fn default_enhancement_timeout() -> u64 {
    60
}

fn default_concurrent() -> bool {
    true
}
