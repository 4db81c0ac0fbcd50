//! Redis implementation of the connector contract.

use crate::CacheConnector;
use async_trait::async_trait;
use cachelink_core::{
    BackendError, BackendResult, CacheError, CacheResult, Command, ConnectionProfile, Reply,
    ScanPage,
};
use deadpool_redis::redis::{self as driver, Value};
use deadpool_redis::{Config, Connection, Pool, PoolError, Runtime};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Redis connector backed by a connection pool.
///
/// The pool is created lazily: no connection is opened until the first
/// command, so connectivity problems surface on first use.
pub struct RedisConnector {
    pool: Pool,
    command_timeout: Duration,
}

impl RedisConnector {
    /// Creates a pooled connector for `profile`.
    ///
    /// Every connection in the pool is bound to `profile.database()` and every
    /// command is bounded by `profile.command_timeout()`.
    pub fn connect(profile: &ConnectionProfile, pool_size: usize) -> CacheResult<Self> {
        let timeout = profile.command_timeout();
        let pool = Config::from_url(profile.connection_url()?)
            .builder()
            .map_err(|e| CacheError::configuration(format!("Invalid Redis config: {}", e)))?
            .max_size(pool_size)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| CacheError::configuration(format!("Failed to create pool: {}", e)))?;

        info!(
            host = %profile.host(),
            port = profile.port(),
            database = profile.database(),
            pool_size,
            "Created Redis connection pool"
        );

        Ok(Self {
            pool,
            command_timeout: timeout,
        })
    }

    /// Returns the timeout applied to every command.
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Checks a connection out of the pool. A pool wait or create timeout is
    /// reported as a command timeout.
    async fn conn(&self) -> BackendResult<Connection> {
        self.pool.get().await.map_err(|e| match e {
            PoolError::Timeout(_) => BackendError::Timeout(self.command_timeout),
            other => BackendError::Pool(other),
        })
    }

    async fn bounded<T, F>(&self, call: F) -> BackendResult<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        tokio::time::timeout(self.command_timeout, call)
            .await
            .map_err(|_| BackendError::Timeout(self.command_timeout))?
    }

    async fn run_single(&self, command: &Command) -> BackendResult<Reply> {
        let mut conn = self.conn().await?;
        let value: Value = to_redis_cmd(command).query_async(&mut *conn).await?;
        into_reply(value)
    }

    async fn run_pipeline(&self, commands: &[Command]) -> BackendResult<Vec<Reply>> {
        let mut pipe = driver::pipe();
        for command in commands {
            pipe.add_command(to_redis_cmd(command));
        }

        let mut conn = self.conn().await?;
        let values: Vec<Value> = pipe.query_async(&mut *conn).await?;

        if values.len() != commands.len() {
            return Err(BackendError::UnexpectedReply(format!(
                "pipeline of {} commands returned {} replies",
                commands.len(),
                values.len()
            )));
        }

        values.into_iter().map(into_reply).collect()
    }

    async fn run_scan(&self, pattern: &str, cursor: u64, count: usize) -> BackendResult<ScanPage> {
        let mut conn = self.conn().await?;
        let (cursor, keys): (u64, Vec<Vec<u8>>) = driver::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut *conn)
            .await?;
        Ok(ScanPage { cursor, keys })
    }

    async fn run_ping(&self) -> BackendResult<()> {
        let mut conn = self.conn().await?;
        let pong: String = driver::cmd("PING").query_async(&mut *conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(BackendError::UnexpectedReply(pong))
        }
    }
}

#[async_trait]
impl CacheConnector for RedisConnector {
    async fn execute(&self, command: Command) -> BackendResult<Reply> {
        self.bounded(self.run_single(&command)).await
    }

    async fn execute_pipelined(&self, commands: Vec<Command>) -> BackendResult<Vec<Reply>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        let replies = self.bounded(self.run_pipeline(&commands)).await?;
        debug!(commands = commands.len(), "Executed pipeline");
        Ok(replies)
    }

    async fn scan(&self, pattern: &str, cursor: u64, count: usize) -> BackendResult<ScanPage> {
        self.bounded(self.run_scan(pattern, cursor, count)).await
    }

    async fn ping(&self) -> BackendResult<()> {
        self.bounded(self.run_ping()).await
    }
}

/// Builds the driver command for a byte-level command.
fn to_redis_cmd(command: &Command) -> driver::Cmd {
    let mut cmd = driver::cmd(command.name());
    cmd.arg(command.key());
    if let Command::Set(_, value) = command {
        cmd.arg(value.as_slice());
    }
    cmd
}

/// Reduces a driver reply to the shapes our commands produce.
fn into_reply(value: Value) -> BackendResult<Reply> {
    match value {
        Value::Nil => Ok(Reply::Nil),
        Value::BulkString(bytes) => Ok(Reply::Data(bytes)),
        Value::Int(n) => Ok(Reply::Integer(n)),
        Value::Okay => Ok(Reply::Status("OK".to_string())),
        Value::SimpleString(status) => Ok(Reply::Status(status)),
        other => Err(BackendError::UnexpectedReply(format!("{:?}", other))),
    }
}
