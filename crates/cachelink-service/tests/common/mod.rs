//! Shared fixtures for cache service tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cachelink_connector::{CacheConnector, ConnectionHandle};
use cachelink_core::{
    BackendError, BackendResult, Command, ConnectionProfile, Reply, ScanPage, SerializerPair,
    TracingConfig,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory store speaking the byte-level command model.
#[derive(Default)]
pub struct InMemoryConnector {
    entries: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
    single_calls: AtomicUsize,
    pipeline_calls: AtomicUsize,
    scan_calls: AtomicUsize,
    fail_pipeline_after: Mutex<Option<usize>>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next pipelines fail after applying `applied` commands.
    pub fn fail_pipelines_after(&self, applied: usize) {
        *self.fail_pipeline_after.lock() = Some(applied);
    }

    /// Stores bytes under a key that may not be valid UTF-8.
    pub fn insert_raw(&self, key: Vec<u8>, value: Vec<u8>) {
        self.entries.lock().insert(key, value);
    }

    pub fn raw(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn pipeline_calls(&self) -> usize {
        self.pipeline_calls.load(Ordering::SeqCst)
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    fn apply(entries: &mut BTreeMap<Vec<u8>, Vec<u8>>, command: Command) -> Reply {
        match command {
            Command::Get(key) => entries.get(&key).cloned().map_or(Reply::Nil, Reply::Data),
            Command::Set(key, value) => {
                entries.insert(key, value);
                Reply::Status("OK".to_string())
            }
            Command::Del(key) => Reply::Integer(i64::from(entries.remove(&key).is_some())),
        }
    }
}

#[async_trait]
impl CacheConnector for InMemoryConnector {
    async fn execute(&self, command: Command) -> BackendResult<Reply> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::apply(&mut self.entries.lock(), command))
    }

    async fn execute_pipelined(&self, commands: Vec<Command>) -> BackendResult<Vec<Reply>> {
        self.pipeline_calls.fetch_add(1, Ordering::SeqCst);
        let fail_after = *self.fail_pipeline_after.lock();
        let mut entries = self.entries.lock();
        let mut replies = Vec::with_capacity(commands.len());

        for (index, command) in commands.into_iter().enumerate() {
            if fail_after == Some(index) {
                return Err(BackendError::UnexpectedReply(
                    "connection reset mid-pipeline".to_string(),
                ));
            }
            replies.push(Self::apply(&mut entries, command));
        }
        Ok(replies)
    }

    /// Pages through keys in sorted order; the cursor is the offset of the
    /// next page.
    async fn scan(&self, pattern: &str, cursor: u64, count: usize) -> BackendResult<ScanPage> {
        assert_eq!(pattern, "*");
        self.scan_calls.fetch_add(1, Ordering::SeqCst);

        let entries = self.entries.lock();
        let start = cursor as usize;
        let keys: Vec<Vec<u8>> = entries.keys().skip(start).take(count).cloned().collect();
        let next = start + keys.len();
        let cursor = if next >= entries.len() { 0 } else { next as u64 };
        Ok(ScanPage { cursor, keys })
    }

    async fn ping(&self) -> BackendResult<()> {
        Ok(())
    }
}

/// Connector whose every call times out.
pub struct FailingConnector;

#[async_trait]
impl CacheConnector for FailingConnector {
    async fn execute(&self, _command: Command) -> BackendResult<Reply> {
        Err(BackendError::Timeout(Duration::from_millis(50)))
    }

    async fn execute_pipelined(&self, _commands: Vec<Command>) -> BackendResult<Vec<Reply>> {
        Err(BackendError::Timeout(Duration::from_millis(50)))
    }

    async fn scan(&self, _pattern: &str, _cursor: u64, _count: usize) -> BackendResult<ScanPage> {
        Err(BackendError::Timeout(Duration::from_millis(50)))
    }

    async fn ping(&self) -> BackendResult<()> {
        Err(BackendError::Timeout(Duration::from_millis(50)))
    }
}

/// Builds a handle over `connector` with the default serializers.
pub fn handle(connector: Arc<dyn CacheConnector>) -> ConnectionHandle {
    let profile = ConnectionProfile::builder()
        .host("localhost")
        .port(6379)
        .build()
        .expect("valid profile");
    ConnectionHandle::new(connector, SerializerPair::default(), profile)
}

/// Installs a test subscriber once per process.
pub fn init_tracing() {
    let _ = cachelink_core::init_tracing(&TracingConfig {
        log_level: "debug".to_string(),
        json_logs: false,
    });
}
