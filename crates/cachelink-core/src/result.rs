//! Result type aliases for cachelink.

use crate::{BackendError, CacheError};

/// A specialized `Result` type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result of a connector call, before it is attributed to an operation.
pub type BackendResult<T> = Result<T, BackendError>;
