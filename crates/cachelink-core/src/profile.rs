//! Connection profile: everything needed to open one handle to the store.

use crate::{CacheError, CacheResult};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Command timeout used when a profile does not set one.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection parameters for one logical database on one server.
///
/// Immutable once built. The password is kept as a secret and never shows up
/// in `Debug` output.
#[derive(Debug)]
pub struct ConnectionProfile {
    host: String,
    port: u16,
    password: Option<SecretString>,
    command_timeout: Duration,
    database: u32,
}

impl ConnectionProfile {
    /// Starts building a profile.
    #[must_use]
    pub fn builder() -> ConnectionProfileBuilder {
        ConnectionProfileBuilder::default()
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    #[must_use]
    pub const fn database(&self) -> u32 {
        self.database
    }

    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Checks the profile invariants.
    pub fn validate(&self) -> CacheResult<()> {
        if self.host.trim().is_empty() {
            return Err(CacheError::configuration("Redis host is required"));
        }
        if self.port == 0 {
            return Err(CacheError::configuration("Redis port must be between 1 and 65535"));
        }
        if self.command_timeout.is_zero() {
            return Err(CacheError::configuration("Redis command timeout must be positive"));
        }
        Ok(())
    }

    /// Renders the profile as a `redis://` URL.
    ///
    /// The password is percent-encoded into the user-info part and the
    /// database index becomes the path.
    pub fn connection_url(&self) -> CacheResult<String> {
        self.validate()?;

        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        let mut url = Url::parse(&format!("redis://{}:{}/{}", host, self.port, self.database))
            .map_err(|e| CacheError::configuration(format!("Invalid Redis address: {}", e)))?;

        if let Some(password) = &self.password {
            url.set_password(Some(password.expose_secret()))
                .map_err(|()| CacheError::configuration("Redis URL cannot carry a password"))?;
        }

        Ok(url.into())
    }

    /// Returns a copy of this profile bound to another database index.
    #[must_use]
    pub fn with_database(&self, database: u32) -> Self {
        Self {
            database,
            ..self.clone()
        }
    }
}

impl Clone for ConnectionProfile {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            port: self.port,
            password: self
                .password
                .as_ref()
                .map(|p| SecretString::from(p.expose_secret().to_owned())),
            command_timeout: self.command_timeout,
            database: self.database,
        }
    }
}

/// Builder for [`ConnectionProfile`].
#[derive(Debug, Default)]
pub struct ConnectionProfileBuilder {
    host: Option<String>,
    port: Option<u16>,
    password: Option<SecretString>,
    command_timeout: Option<Duration>,
    database: u32,
}

impl ConnectionProfileBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the password. Empty strings are treated as "no password".
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password = (!password.is_empty()).then(|| SecretString::from(password));
        self
    }

    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn database(mut self, database: u32) -> Self {
        self.database = database;
        self
    }

    /// Builds the profile, failing if host or port are missing or the
    /// timeout is zero.
    pub fn build(self) -> CacheResult<ConnectionProfile> {
        let host = self
            .host
            .ok_or_else(|| CacheError::configuration("Redis host is required"))?;
        let port = self
            .port
            .ok_or_else(|| CacheError::configuration("Redis port is required"))?;

        let profile = ConnectionProfile {
            host,
            port,
            password: self.password,
            command_timeout: self.command_timeout.unwrap_or(DEFAULT_COMMAND_TIMEOUT),
            database: self.database,
        };
        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ConnectionProfile {
        ConnectionProfile::builder()
            .host("cache.internal")
            .port(6380)
            .command_timeout(Duration::from_millis(500))
            .database(3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_profile() {
        let profile = profile();
        assert_eq!(profile.host(), "cache.internal");
        assert_eq!(profile.port(), 6380);
        assert_eq!(profile.database(), 3);
        assert_eq!(profile.command_timeout(), Duration::from_millis(500));
        assert!(!profile.has_password());
    }

    #[test]
    fn test_missing_host_is_configuration_error() {
        let result = ConnectionProfile::builder().port(6379).build();
        assert!(matches!(result, Err(CacheError::Configuration(msg)) if msg.contains("host")));
    }

    #[test]
    fn test_missing_port_is_configuration_error() {
        let result = ConnectionProfile::builder().host("localhost").build();
        assert!(matches!(result, Err(CacheError::Configuration(msg)) if msg.contains("port")));
    }

    #[test]
    fn test_blank_host_rejected() {
        let result = ConnectionProfile::builder().host("  ").port(6379).build();
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_zero_port_rejected() {
        let result = ConnectionProfile::builder().host("localhost").port(0).build();
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ConnectionProfile::builder()
            .host("localhost")
            .port(6379)
            .command_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(CacheError::Configuration(msg)) if msg.contains("timeout")));
    }

    #[test]
    fn test_default_timeout() {
        let profile = ConnectionProfile::builder()
            .host("localhost")
            .port(6379)
            .build()
            .unwrap();
        assert_eq!(profile.command_timeout(), DEFAULT_COMMAND_TIMEOUT);
        assert_eq!(profile.database(), 0);
    }

    #[test]
    fn test_connection_url_without_password() {
        assert_eq!(profile().connection_url().unwrap(), "redis://cache.internal:6380/3");
    }

    #[test]
    fn test_connection_url_encodes_password() {
        let profile = ConnectionProfile::builder()
            .host("localhost")
            .port(6379)
            .password("p@ss:w/rd")
            .build()
            .unwrap();
        let url = profile.connection_url().unwrap();
        assert_eq!(url, "redis://:p%40ss%3Aw%2Frd@localhost:6379/0");
    }

    #[test]
    fn test_empty_password_is_no_password() {
        let profile = ConnectionProfile::builder()
            .host("localhost")
            .port(6379)
            .password("")
            .build()
            .unwrap();
        assert!(!profile.has_password());
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let profile = ConnectionProfile::builder().host("::1").port(6379).build().unwrap();
        assert_eq!(profile.connection_url().unwrap(), "redis://[::1]:6379/0");
    }

    #[test]
    fn test_debug_redacts_password() {
        let profile = ConnectionProfile::builder()
            .host("localhost")
            .port(6379)
            .password("hunter2")
            .build()
            .unwrap();
        assert!(!format!("{:?}", profile).contains("hunter2"));
    }

    #[test]
    fn test_with_database_keeps_credentials() {
        let base = ConnectionProfile::builder()
            .host("localhost")
            .port(6379)
            .password("secret")
            .build()
            .unwrap();
        let other = base.with_database(7);
        assert_eq!(other.database(), 7);
        assert!(other.has_password());
        assert_eq!(base.database(), 0);
    }
}
