//! # cachelink core
//!
//! Foundational types shared by every cachelink crate: the error model, the
//! connection profile, the byte-level command model handed to connectors,
//! and the key/value serializer contract.

pub mod command;
pub mod error;
pub mod profile;
pub mod result;
pub mod serializer;
pub mod telemetry;

pub use command::*;
pub use error::*;
pub use profile::*;
pub use result::*;
pub use serializer::*;
pub use telemetry::{init_tracing, TracingConfig};
