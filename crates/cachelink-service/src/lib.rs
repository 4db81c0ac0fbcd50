//! # cachelink service
//!
//! Key/value operations over a [`ConnectionHandle`](cachelink_connector::ConnectionHandle):
//! single get/save/delete, pipelined batch get/save/delete, and cursor-based
//! key enumeration.

pub mod cache_service;
pub mod r#impl;

pub use cache_service::*;
pub use r#impl::CacheServiceImpl;
