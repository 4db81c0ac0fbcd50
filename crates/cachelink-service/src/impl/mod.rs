//! Service implementations.

mod cache_service_impl;

pub use cache_service_impl::CacheServiceImpl;
