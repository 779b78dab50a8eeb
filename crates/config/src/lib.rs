//! Configuration module for the bandit allocation service.

use serde::Deserialize;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub database_max_connections: u32,
    /// Address to bind the server to
    pub bind_address: String,
    /// Default aggregation window in days
    pub default_window_days: i32,
    /// Maximum aggregation window in days (used when expanding)
    pub max_window_days: i32,
    /// Per-variant impression count below which data is insufficient
    pub min_impressions: i64,
    /// Monte Carlo sample count for the Thompson sampler
    pub thompson_samples: u32,
    /// Beta prior alpha (successes)
    pub prior_alpha: i64,
    /// Beta prior beta (failures)
    pub prior_beta: i64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: env_var("DATABASE_URL")?,
            database_max_connections: env_var_parse("DATABASE_MAX_CONNECTIONS", 10)?,
            bind_address: env_var_or("BIND_ADDRESS", "0.0.0.0:8080"),
            default_window_days: env_var_parse("DEFAULT_WINDOW_DAYS", 14)?,
            max_window_days: env_var_parse("MAX_WINDOW_DAYS", 30)?,
            min_impressions: env_var_parse("MIN_IMPRESSIONS", 200)?,
            thompson_samples: env_var_parse("THOMPSON_SAMPLES", 10_000)?,
            prior_alpha: env_var_parse("PRIOR_ALPHA", 1)?,
            prior_beta: env_var_parse("PRIOR_BETA", 99)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_max_connections == 0 {
            return Err(invalid(
                "DATABASE_MAX_CONNECTIONS",
                self.database_max_connections,
            ));
        }
        if self.default_window_days < 1 {
            return Err(invalid("DEFAULT_WINDOW_DAYS", self.default_window_days));
        }
        if self.max_window_days < self.default_window_days {
            return Err(invalid("MAX_WINDOW_DAYS", self.max_window_days));
        }
        if self.min_impressions < 0 {
            return Err(invalid("MIN_IMPRESSIONS", self.min_impressions));
        }
        if self.thompson_samples == 0 {
            return Err(invalid("THOMPSON_SAMPLES", self.thompson_samples));
        }
        // Posterior parameters must stay strictly positive for any (n, k).
        if self.prior_alpha < 1 {
            return Err(invalid("PRIOR_ALPHA", self.prior_alpha));
        }
        if self.prior_beta < 1 {
            return Err(invalid("PRIOR_BETA", self.prior_beta));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl Display) -> ConfigError {
    ConfigError::InvalidValue(name.to_string(), value.to_string())
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_var_parse<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://unused".to_string(),
            database_max_connections: 10,
            bind_address: "127.0.0.1:0".to_string(),
            default_window_days: 14,
            max_window_days: 30,
            min_impressions: 200,
            thompson_samples: 10_000,
            prior_alpha: 1,
            prior_beta: 99,
        }
    }

    #[test]
    fn test_env_var_or_uses_default() {
        let val = env_var_or("NON_EXISTENT_VAR_12345", "default_value");
        assert_eq!(val, "default_value");
    }

    #[test]
    fn test_env_var_parse_uses_default_when_unset() {
        let val: i32 = env_var_parse("NON_EXISTENT_VAR_67890", 14).unwrap();
        assert_eq!(val, 14);
    }

    #[test]
    fn test_defaults_pass_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_prior() {
        let config = AppConfig {
            prior_alpha: 0,
            ..base_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_, _))
        ));
    }

    #[test]
    fn test_validate_rejects_max_window_below_default() {
        let config = AppConfig {
            max_window_days: 7,
            ..base_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_, _))
        ));
    }
}
