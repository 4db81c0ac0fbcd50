//! Unified error types for the cache access layer.

use std::fmt;
use std::string::FromUtf8Error;
use std::time::Duration;
use thiserror::Error;

/// The cache operation an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOperation {
    Connect,
    Save,
    Get,
    GetAllKeys,
    Delete,
    BatchSave,
    BatchGet,
    BatchDelete,
    HealthCheck,
}

impl CacheOperation {
    /// Returns the operation name used in logs and error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Save => "save",
            Self::Get => "get",
            Self::GetAllKeys => "get_all_keys",
            Self::Delete => "delete",
            Self::BatchSave => "batch_save",
            Self::BatchGet => "batch_get",
            Self::BatchDelete => "batch_delete",
            Self::HealthCheck => "health_check",
        }
    }
}

impl fmt::Display for CacheOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures coming from below the operation boundary: the driver, the pool,
/// the command timeout, or the serializers.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Redis driver error (I/O, protocol, server error reply).
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Connection pool error.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// The command did not complete within the configured command timeout.
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    /// Value (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored key is not valid UTF-8.
    #[error("Key encoding error: {0}")]
    KeyEncoding(#[from] FromUtf8Error),

    /// The store answered with a reply shape the command does not produce.
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

impl BackendError {
    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Pool(_) => true,
            Self::Redis(e) => e.is_io_error() || e.is_timeout() || e.is_connection_dropped(),
            Self::Serialization(_) | Self::KeyEncoding(_) | Self::UnexpectedReply(_) => false,
        }
    }
}

/// The single error kind surfaced to callers of the cache layer.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Invalid or missing connection configuration. Raised only while
    /// loading configuration or setting up connections.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A precondition on the arguments failed; no I/O was attempted.
    #[error("Invalid argument for {operation}: {message}")]
    InvalidArgument {
        operation: CacheOperation,
        message: String,
    },

    /// The operation failed in the connector, the timeout, or the serializers.
    #[error("{operation} failed{context}: {source}")]
    Backend {
        operation: CacheOperation,
        context: KeyContext,
        #[source]
        source: BackendError,
    },
}

impl CacheError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a precondition error for an operation.
    #[must_use]
    pub fn invalid_argument<T: Into<String>>(operation: CacheOperation, message: T) -> Self {
        Self::InvalidArgument {
            operation,
            message: message.into(),
        }
    }

    /// Wraps a backend failure with the operation and the keys involved.
    #[must_use]
    pub fn backend(operation: CacheOperation, context: KeyContext, source: BackendError) -> Self {
        Self::Backend {
            operation,
            context,
            source,
        }
    }

    /// Returns the operation this error was raised from, if any.
    #[must_use]
    pub const fn operation(&self) -> Option<CacheOperation> {
        match self {
            Self::Configuration(_) => None,
            Self::InvalidArgument { operation, .. } | Self::Backend { operation, .. } => {
                Some(*operation)
            }
        }
    }

    /// Returns true if the caller may retry the operation.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Backend { source, .. } => source.is_transient(),
            Self::Configuration(_) | Self::InvalidArgument { .. } => false,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Backend {
                source: BackendError::Timeout(_),
                ..
            } => "TIMEOUT",
            Self::Backend { .. } => "CACHE_ERROR",
        }
    }
}

/// The key or keys an operation was working on, rendered into error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyContext {
    #[default]
    None,
    Key(String),
    Keys(Vec<String>),
}

impl KeyContext {
    /// Context for a single key.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Context for a key set.
    #[must_use]
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keys(keys.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for KeyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Key(key) => write!(f, " for key '{}'", key),
            Self::Keys(keys) => write!(f, " for keys [{}]", keys.join(", ")),
        }
    }
}
