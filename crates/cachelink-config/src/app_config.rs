//! Application configuration structures.

use cachelink_core::{CacheError, CacheResult, ConnectionProfile, TracingConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Redis connection settings.
    #[serde(default)]
    pub redis: RedisSettings,

    /// Logging configuration.
    #[serde(default)]
    pub observability: TracingConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "cachelink".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Redis connection settings.
///
/// `database` is the index used by the default connection, `custom_database`
/// the index used by the custom connection. Additional named profiles inherit
/// any field they leave unset from these top-level values.
#[derive(Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub password: Option<String>,

    /// Command timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub database: u32,

    #[serde(default)]
    pub custom_database: u32,

    /// Maximum number of pooled connections per handle.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Additional named profiles.
    #[serde(default)]
    pub profiles: HashMap<String, ProfileSettings>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_pool_size() -> usize {
    16
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: None,
            timeout_ms: default_timeout_ms(),
            database: 0,
            custom_database: 0,
            pool_size: default_pool_size(),
            profiles: HashMap::new(),
        }
    }
}

impl fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_ms", &self.timeout_ms)
            .field("database", &self.database)
            .field("custom_database", &self.custom_database)
            .field("pool_size", &self.pool_size)
            .field("profiles", &self.profiles)
            .finish()
    }
}

impl RedisSettings {
    /// Returns the command timeout as a Duration.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Profile for the process-wide default connection.
    pub fn default_profile(&self) -> CacheResult<ConnectionProfile> {
        self.profile_for_database(self.database)
    }

    /// Profile for the custom connection (`custom_database`).
    pub fn custom_profile(&self) -> CacheResult<ConnectionProfile> {
        self.profile_for_database(self.custom_database)
    }

    /// Profile for an additional named connection.
    pub fn named_profile(&self, name: &str) -> CacheResult<ConnectionProfile> {
        let settings = self.profiles.get(name).ok_or_else(|| {
            CacheError::configuration(format!("Unknown Redis profile '{}'", name))
        })?;

        let mut builder = ConnectionProfile::builder()
            .host(settings.host.clone().unwrap_or_else(|| self.host.clone()))
            .port(settings.port.unwrap_or(self.port))
            .command_timeout(Duration::from_millis(
                settings.timeout_ms.unwrap_or(self.timeout_ms),
            ))
            .database(settings.database);

        if let Some(password) = settings.password.as_ref().or(self.password.as_ref()) {
            builder = builder.password(password.clone());
        }

        builder.build()
    }

    fn profile_for_database(&self, database: u32) -> CacheResult<ConnectionProfile> {
        let mut builder = ConnectionProfile::builder()
            .host(self.host.clone())
            .port(self.port)
            .command_timeout(self.command_timeout())
            .database(database);

        if let Some(password) = &self.password {
            builder = builder.password(password.clone());
        }

        builder.build()
    }
}

/// Overrides for an additional named profile.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub database: u32,
}

impl fmt::Debug for ProfileSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_ms", &self.timeout_ms)
            .field("database", &self.database)
            .finish()
    }
}
