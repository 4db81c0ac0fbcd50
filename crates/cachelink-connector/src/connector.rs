//! Connector contract.

use async_trait::async_trait;
use cachelink_core::{BackendResult, Command, Reply, ScanPage};

/// The capabilities the cache layer needs from a store driver.
///
/// Implementations must be safe for concurrent use and must bound every call
/// by their command timeout.
#[async_trait]
pub trait CacheConnector: Send + Sync {
    /// Executes a single command.
    async fn execute(&self, command: Command) -> BackendResult<Reply>;

    /// Sends all commands in one round trip and returns one reply per
    /// command, in order.
    ///
    /// This is not a transaction: commands before a failing one may already
    /// have been applied.
    async fn execute_pipelined(&self, commands: Vec<Command>) -> BackendResult<Vec<Reply>>;

    /// Returns one page of keys matching `pattern`, starting at `cursor`.
    async fn scan(&self, pattern: &str, cursor: u64, count: usize) -> BackendResult<ScanPage>;

    /// Round-trips a `PING`.
    async fn ping(&self) -> BackendResult<()>;
}
