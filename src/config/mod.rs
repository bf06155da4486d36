//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `MATERNITY_RISK` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use maternity_risk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod assessment;
mod database;
mod error;
mod server;

pub use ai::AiConfig;
pub use assessment::AssessmentConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// AI service configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// AI enhancement bounds
    #[serde(default)]
    pub assessment: AssessmentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `MATERNITY_RISK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `MATERNITY_RISK__DATABASE__URL=...` -> `database.url = ...`
    /// - `MATERNITY_RISK__AI__API_KEY=...` -> `ai.api_key = ...`
    ///
    /// A `.env` file is read first when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MATERNITY_RISK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.ai.validate()?;
        self.assessment.validate()?;
        self.validate_timeouts()?;
        Ok(())
    }

    /// The HTTP timeout must not cut off the AI calls it is waiting on.
    fn validate_timeouts(&self) -> Result<(), ValidationError> {
        let per_call = self.assessment.enhancement_timeout_secs;
        let enhancement_secs = if self.assessment.concurrent_enhancement {
            per_call
        } else {
            per_call * 2
        } + self.ai.probe_timeout_secs;

        if self.server.request_timeout_secs <= enhancement_secs {
            return Err(ValidationError::RequestTimeoutTooShort {
                request_secs: self.server.request_timeout_secs,
                enhancement_secs,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "MATERNITY_RISK__DATABASE__URL",
        "MATERNITY_RISK__SERVER__PORT",
        "MATERNITY_RISK__SERVER__ENVIRONMENT",
        "MATERNITY_RISK__AI__API_KEY",
        "MATERNITY_RISK__ASSESSMENT__ENHANCEMENT_TIMEOUT_SECS",
        "MATERNITY_RISK__ASSESSMENT__CONCURRENT_ENHANCEMENT",
    ];

    fn set_minimal_env() {
        env::set_var("MATERNITY_RISK__DATABASE__URL", "postgresql://test@localhost/test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.assessment.enhancement_timeout_secs, 60);
        assert!(!config.ai.has_api_key());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("MATERNITY_RISK__SERVER__PORT", "3000"),
            ("MATERNITY_RISK__SERVER__ENVIRONMENT", "production"),
            ("MATERNITY_RISK__AI__API_KEY", "sk-test"),
            ("MATERNITY_RISK__ASSESSMENT__ENHANCEMENT_TIMEOUT_SECS", "30"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert!(config.ai.has_api_key());
        assert_eq!(config.assessment.enhancement_timeout_secs, 30);
    }

    #[test]
    fn test_missing_database_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn test_request_timeout_must_cover_sequential_enhancement() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("MATERNITY_RISK__ASSESSMENT__CONCURRENT_ENHANCEMENT", "false")])
            .unwrap();

        // 2 x 60s calls + 5s probe = 125s, inside the 150s default.
        assert!(config.validate().is_ok());

        let tight = AppConfig {
            server: ServerConfig {
                request_timeout_secs: 120,
                ..config.server.clone()
            },
            ..config
        };
        assert!(matches!(
            tight.validate(),
            Err(ValidationError::RequestTimeoutTooShort { enhancement_secs: 125, .. })
        ));
    }
}
