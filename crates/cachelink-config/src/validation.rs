//! Configuration validation.
//!
//! Collects every problem in one pass so a misconfigured deployment reports
//! all of them at startup.

use crate::{AppConfig, ProfileSettings, RedisSettings};
use cachelink_core::TracingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    /// Host is empty.
    #[error("Redis host for {profile} cannot be empty")]
    MissingHost { profile: String },

    /// Port is zero.
    #[error("Invalid Redis port for {profile}: {value} (must be 1-65535)")]
    InvalidPort { profile: String, value: u16 },

    /// Timeout value must be positive.
    #[error("Timeout '{name}' must be positive, got {value}")]
    NonPositiveTimeout { name: String, value: u64 },

    /// Pool size is zero or too large.
    #[error("Invalid pool size {value} (must be between 1 and {maximum})")]
    InvalidPoolSize { value: usize, maximum: usize },

    /// Log level is not a valid filter directive.
    #[error("Invalid log level: '{value}' ({reason})")]
    InvalidLogLevel { value: String, reason: String },
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: usize = 1000;

    /// Validates the entire configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_redis(&config.redis, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_redis(config: &RedisSettings, errors: &mut Vec<ConfigValidationError>) {
        Self::validate_endpoint("redis", &config.host, config.port, config.timeout_ms, errors);

        if config.pool_size == 0 || config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::InvalidPoolSize {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        let mut names: Vec<&String> = config.profiles.keys().collect();
        names.sort();
        for name in names {
            let profile: &ProfileSettings = &config.profiles[name];
            Self::validate_endpoint(
                &format!("redis.profiles.{}", name),
                profile.host.as_deref().unwrap_or(&config.host),
                profile.port.unwrap_or(config.port),
                profile.timeout_ms.unwrap_or(config.timeout_ms),
                errors,
            );
        }
    }

    fn validate_endpoint(
        profile: &str,
        host: &str,
        port: u16,
        timeout_ms: u64,
        errors: &mut Vec<ConfigValidationError>,
    ) {
        if host.trim().is_empty() {
            errors.push(ConfigValidationError::MissingHost {
                profile: profile.to_string(),
            });
        }
        if port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                profile: profile.to_string(),
                value: port,
            });
        }
        if timeout_ms == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: format!("{}.timeout_ms", profile),
                value: 0,
            });
        }
    }

    fn validate_observability(config: &TracingConfig, errors: &mut Vec<ConfigValidationError>) {
        // Accepts the same directives `init_tracing` does, e.g. `cachelink=debug,warn`.
        if let Err(e) = EnvFilter::try_new(&config.log_level) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
                reason: e.to_string(),
            });
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}
