//! AI service configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::ChatCompletionsConfig;

/// Connection settings for the OpenAI-compatible AI service.
///
/// Without an API key the service is reported unavailable and every
/// assessment is rule-based only.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Availability probe timeout in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl AiConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Client settings for the chat-completions adapter.
    pub fn client_config(&self) -> ChatCompletionsConfig {
        ChatCompletionsConfig::new(self.api_key.clone())
            .with_base_url(&self.base_url)
            .with_model(&self.model)
            .with_probe_timeout(self.probe_timeout())
            .with_temperature(self.temperature)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidAiBaseUrl(self.base_url.clone()));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("MATERNITY_RISK__AI__MODEL"));
        }
        if self.probe_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            probe_timeout_secs: default_probe_timeout(),
            temperature: default_temperature(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_temperature() -> f32 {
    0.3
}
