//! Builds connection handles from settings.

use crate::{ConnectionHandle, RedisConnector};
use cachelink_config::RedisSettings;
use cachelink_core::{
    CacheError, CacheResult, ConnectionProfile, KeySerializer, SerializerPair, ValueSerializer,
};
use std::sync::Arc;
use tracing::debug;

/// Turns [`RedisSettings`] into connection handles, each wired with the same
/// key serializer and value serializer.
pub struct ConnectionConfigurator {
    settings: RedisSettings,
    serializers: SerializerPair,
}

impl ConnectionConfigurator {
    /// Creates a configurator with UTF-8 keys and JSON values.
    #[must_use]
    pub fn new(settings: RedisSettings) -> Self {
        Self::with_serializers(settings, SerializerPair::default())
    }

    /// Creates a configurator with custom serializers.
    #[must_use]
    pub fn with_serializers(settings: RedisSettings, serializers: SerializerPair) -> Self {
        Self {
            settings,
            serializers,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &RedisSettings {
        &self.settings
    }

    #[must_use]
    pub fn key_serializer(&self) -> Arc<dyn KeySerializer> {
        Arc::clone(self.serializers.key_serializer())
    }

    #[must_use]
    pub fn value_serializer(&self) -> Arc<dyn ValueSerializer> {
        Arc::clone(self.serializers.value_serializer())
    }

    #[must_use]
    pub fn serializers(&self) -> &SerializerPair {
        &self.serializers
    }

    /// Builds a handle for the default profile.
    ///
    /// No connection is opened here; connectivity errors surface on first use.
    pub fn build_default_connection(&self) -> CacheResult<ConnectionHandle> {
        self.open(self.settings.default_profile()?)
    }

    /// The profile described by `custom_database`.
    pub fn custom_profile(&self) -> CacheResult<ConnectionProfile> {
        self.settings.custom_profile()
    }

    /// Builds a handle scoped to `profile.database()`, applying its command
    /// timeout to every command.
    pub fn build_custom_connection(&self, profile: &ConnectionProfile) -> CacheResult<ConnectionHandle> {
        self.open(profile.clone())
    }

    /// Builds a handle for a profile declared under `redis.profiles.<name>`.
    pub fn build_named_connection(&self, name: &str) -> CacheResult<ConnectionHandle> {
        let profile = self.settings.named_profile(name)?;
        debug!(profile = name, "Building named Redis connection");
        self.open(profile)
    }

    fn open(&self, profile: ConnectionProfile) -> CacheResult<ConnectionHandle> {
        profile.validate()?;
        if self.settings.pool_size == 0 {
            return Err(CacheError::configuration("Redis pool size must be at least 1"));
        }
        let connector = RedisConnector::connect(&profile, self.settings.pool_size)?;
        Ok(ConnectionHandle::new(
            Arc::new(connector),
            self.serializers.clone(),
            profile,
        ))
    }
}
