//! # cachelink connector
//!
//! The boundary between cachelink and the store. [`CacheConnector`] is the
//! whole contract the cache layer relies on; [`RedisConnector`] implements it
//! on a `deadpool-redis` pool. [`ConnectionConfigurator`] turns settings into
//! ready-to-use [`ConnectionHandle`]s.

mod configurator;
mod connector;
mod handle;
pub mod redis;

pub use configurator::ConnectionConfigurator;
pub use connector::CacheConnector;
pub use handle::ConnectionHandle;
pub use redis::RedisConnector;
