//! Cache service over a connection handle.

use crate::CacheService;
use async_trait::async_trait;
use cachelink_connector::{CacheConnector, ConnectionHandle};
use cachelink_core::{
    BackendError, BackendResult, CacheError, CacheOperation, CacheResult, Command, KeyContext,
    SerializerPair,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, warn};

/// Pattern used when enumerating keys.
const SCAN_PATTERN: &str = "*";

/// Number of keys requested per scan page.
const SCAN_BATCH_SIZE: usize = 100;

/// [`CacheService`] implementation.
///
/// Holds only the handle it was given; every key and value goes through the
/// handle's serializers, on single and pipelined paths alike.
pub struct CacheServiceImpl {
    handle: ConnectionHandle,
}

impl CacheServiceImpl {
    /// Creates a service that owns `handle`.
    #[must_use]
    pub fn new(handle: ConnectionHandle) -> Self {
        Self { handle }
    }

    fn connector(&self) -> &dyn CacheConnector {
        self.handle.connector()
    }

    fn serializers(&self) -> &SerializerPair {
        self.handle.serializers()
    }

    /// Logs a backend failure once and attributes it to the operation.
    fn fail(operation: CacheOperation, context: KeyContext, source: BackendError) -> CacheError {
        error!(
            operation = %operation,
            keys = ?context,
            error = %source,
            "Cache operation failed"
        );
        CacheError::backend(operation, context, source)
    }

    async fn set_value(&self, key: &str, value: &Value) -> BackendResult<()> {
        let serializers = self.serializers();
        let command = Command::Set(serializers.serialize_key(key), serializers.serialize_value(value)?);
        self.connector().execute(command).await?.into_ok()
    }

    async fn get_value(&self, key: &str) -> BackendResult<Option<Value>> {
        let serializers = self.serializers();
        let reply = self
            .connector()
            .execute(Command::Get(serializers.serialize_key(key)))
            .await?;
        reply
            .into_data()?
            .map(|bytes| serializers.deserialize_value(&bytes))
            .transpose()
    }

    async fn delete_key(&self, key: &str) -> BackendResult<bool> {
        let reply = self
            .connector()
            .execute(Command::Del(self.serializers().serialize_key(key)))
            .await?;
        Ok(reply.into_integer()? > 0)
    }

    async fn scan_all_keys(&self) -> BackendResult<HashSet<String>> {
        let serializers = self.serializers();
        let mut keys = HashSet::new();
        let mut cursor = 0;

        loop {
            let page = self
                .connector()
                .scan(SCAN_PATTERN, cursor, SCAN_BATCH_SIZE)
                .await?;
            for raw in &page.keys {
                let key = serializers.deserialize_key(raw).unwrap_or_else(|e| {
                    warn!(raw = ?raw, error = %e, "Key is not valid UTF-8, decoding lossily");
                    String::from_utf8_lossy(raw).into_owned()
                });
                keys.insert(key);
            }
            if page.is_last() {
                break;
            }
            cursor = page.cursor;
        }

        Ok(keys)
    }

    async fn pipeline_set(&self, entries: &[(String, Value)]) -> BackendResult<()> {
        let serializers = self.serializers();
        let commands = entries
            .iter()
            .map(|(key, value)| {
                Ok(Command::Set(
                    serializers.serialize_key(key),
                    serializers.serialize_value(value)?,
                ))
            })
            .collect::<BackendResult<Vec<_>>>()?;

        for reply in self.connector().execute_pipelined(commands).await? {
            reply.into_ok()?;
        }
        Ok(())
    }

    async fn pipeline_get(&self, keys: &[&str]) -> BackendResult<Vec<Option<Value>>> {
        let serializers = self.serializers();
        let commands = keys
            .iter()
            .map(|key| Command::Get(serializers.serialize_key(key)))
            .collect();

        self.connector()
            .execute_pipelined(commands)
            .await?
            .into_iter()
            .map(|reply| {
                reply
                    .into_data()?
                    .map(|bytes| serializers.deserialize_value(&bytes))
                    .transpose()
            })
            .collect()
    }

    async fn pipeline_delete(&self, keys: &[String]) -> BackendResult<i64> {
        let serializers = self.serializers();
        let commands = keys
            .iter()
            .map(|key| Command::Del(serializers.serialize_key(key)))
            .collect();

        let mut deleted = 0;
        for reply in self.connector().execute_pipelined(commands).await? {
            deleted += reply.into_integer()?;
        }
        Ok(deleted)
    }
}

/// Rejects an empty key list or a list containing an empty key.
fn check_keys(operation: CacheOperation, keys: &[String], action: &str) -> CacheResult<()> {
    if keys.is_empty() {
        return Err(CacheError::invalid_argument(
            operation,
            format!("no keys to {}", action),
        ));
    }
    if keys.iter().any(String::is_empty) {
        return Err(CacheError::invalid_argument(
            operation,
            "keys cannot contain an empty key",
        ));
    }
    Ok(())
}

/// Splits `keys` into the distinct keys in first-seen order and, for every
/// input position, the index of its key among the distinct ones.
fn distinct_keys(keys: &[String]) -> (Vec<&str>, Vec<usize>) {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut distinct = Vec::new();
    let slots = keys
        .iter()
        .map(|key| {
            *index.entry(key.as_str()).or_insert_with(|| {
                distinct.push(key.as_str());
                distinct.len() - 1
            })
        })
        .collect();
    (distinct, slots)
}

#[async_trait]
impl CacheService for CacheServiceImpl {
    async fn save(&self, key: &str, value: &Value) -> CacheResult<()> {
        if key.is_empty() {
            return Err(CacheError::invalid_argument(
                CacheOperation::Save,
                "key cannot be empty",
            ));
        }
        if value.is_null() {
            return Err(CacheError::invalid_argument(
                CacheOperation::Save,
                format!("value for key '{}' cannot be null", key),
            ));
        }

        self.set_value(key, value)
            .await
            .map_err(|e| Self::fail(CacheOperation::Save, KeyContext::key(key), e))?;

        debug!("Saved key '{}'", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        if key.is_empty() {
            debug!("Skipping get for empty key");
            return Ok(None);
        }

        let value = self
            .get_value(key)
            .await
            .map_err(|e| Self::fail(CacheOperation::Get, KeyContext::key(key), e))?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn get_all_keys(&self) -> CacheResult<HashSet<String>> {
        let keys = self
            .scan_all_keys()
            .await
            .map_err(|e| Self::fail(CacheOperation::GetAllKeys, KeyContext::None, e))?;

        debug!(count = keys.len(), "Enumerated keys");
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        if key.is_empty() {
            return Err(CacheError::invalid_argument(
                CacheOperation::Delete,
                "key cannot be empty while deleting",
            ));
        }

        let deleted = self
            .delete_key(key)
            .await
            .map_err(|e| Self::fail(CacheOperation::Delete, KeyContext::key(key), e))?;

        debug!("Deleted key '{}': {}", key, deleted);
        Ok(deleted)
    }

    async fn batch_save(&self, entries: &[(String, Value)]) -> CacheResult<()> {
        if entries.is_empty() {
            return Err(CacheError::invalid_argument(
                CacheOperation::BatchSave,
                "no entries to batch save",
            ));
        }
        if let Some((key, _)) = entries.iter().find(|(key, value)| key.is_empty() || value.is_null()) {
            let message = if key.is_empty() {
                "entries cannot contain an empty key".to_string()
            } else {
                format!("value for key '{}' cannot be null", key)
            };
            return Err(CacheError::invalid_argument(CacheOperation::BatchSave, message));
        }

        self.pipeline_set(entries).await.map_err(|e| {
            Self::fail(
                CacheOperation::BatchSave,
                KeyContext::keys(entries.iter().map(|(key, _)| key.clone())),
                e,
            )
        })?;

        debug!(count = entries.len(), "Batch saved entries");
        Ok(())
    }

    async fn batch_get(&self, keys: &[String]) -> CacheResult<Vec<Option<Value>>> {
        check_keys(CacheOperation::BatchGet, keys, "batch get")?;

        let (distinct, slots) = distinct_keys(keys);
        let fetched = self.pipeline_get(&distinct).await.map_err(|e| {
            Self::fail(CacheOperation::BatchGet, KeyContext::keys(distinct.iter().copied()), e)
        })?;
        let values: Vec<Option<Value>> = slots
            .into_iter()
            .map(|i| fetched.get(i).cloned().flatten())
            .collect();

        debug!(
            requested = keys.len(),
            fetched = distinct.len(),
            hits = values.iter().filter(|v| v.is_some()).count(),
            "Batch get completed"
        );
        Ok(values)
    }

    async fn batch_delete(&self, keys: &[String]) -> CacheResult<()> {
        check_keys(CacheOperation::BatchDelete, keys, "batch delete")?;

        let deleted = self.pipeline_delete(keys).await.map_err(|e| {
            Self::fail(CacheOperation::BatchDelete, KeyContext::keys(keys.iter().cloned()), e)
        })?;

        debug!(requested = keys.len(), deleted, "Batch delete completed");
        Ok(())
    }
}

impl std::fmt::Debug for CacheServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheServiceImpl")
            .field("handle", &self.handle)
            .finish()
    }
}
