//! Connection handle.

use crate::CacheConnector;
use cachelink_core::{
    CacheError, CacheOperation, CacheResult, ConnectionProfile, KeyContext, SerializerPair,
};
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// A reusable, concurrency-safe channel to the store, bound to one profile
/// and carrying the serializers attached when it was built.
pub struct ConnectionHandle {
    connector: Arc<dyn CacheConnector>,
    serializers: SerializerPair,
    profile: ConnectionProfile,
}

impl ConnectionHandle {
    /// Wraps a connector. Used by [`ConnectionConfigurator`](crate::ConnectionConfigurator)
    /// and by callers that bring their own connector implementation.
    #[must_use]
    pub fn new(
        connector: Arc<dyn CacheConnector>,
        serializers: SerializerPair,
        profile: ConnectionProfile,
    ) -> Self {
        Self {
            connector,
            serializers,
            profile,
        }
    }

    #[must_use]
    pub fn connector(&self) -> &dyn CacheConnector {
        self.connector.as_ref()
    }

    #[must_use]
    pub fn serializers(&self) -> &SerializerPair {
        &self.serializers
    }

    #[must_use]
    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// Checks that the store is reachable.
    pub async fn health_check(&self) -> CacheResult<()> {
        self.connector.ping().await.map_err(|e| {
            error!(
                host = %self.profile.host(),
                port = self.profile.port(),
                database = self.profile.database(),
                error = %e,
                "Redis health check failed"
            );
            CacheError::backend(CacheOperation::HealthCheck, KeyContext::None, e)
        })
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}
