//! Cache service contract.

use async_trait::async_trait;
use cachelink_core::{BackendError, CacheError, CacheOperation, CacheResult, KeyContext};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Key/value operations against one connection.
///
/// Values are structured JSON values; use [`CacheServiceExt`] for typed
/// access. Every failure is reported as a [`CacheError`] naming the operation
/// and the key or keys involved.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Fails with `InvalidArgument` if the key is empty or the value is
    /// `null`; nothing is sent to the store in that case.
    async fn save(&self, key: &str, value: &Value) -> CacheResult<()>;

    /// Returns the value stored under `key`, or `None` if the key is empty
    /// or absent.
    async fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Returns every key currently in the database.
    ///
    /// Enumerates incrementally with a cursor; keys added or removed while
    /// the scan runs may or may not be included.
    async fn get_all_keys(&self) -> CacheResult<HashSet<String>>;

    /// Deletes `key`. Returns `true` if a key was actually removed.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Stores all entries in one pipelined round trip, in the given order.
    ///
    /// The pipeline is not a transaction: if it fails part way, entries
    /// already applied stay applied.
    async fn batch_save(&self, entries: &[(String, Value)]) -> CacheResult<()>;

    /// Fetches all keys in one pipelined round trip.
    ///
    /// Returns one slot per given key, in the order the keys were given; a
    /// missing key yields `None` at its position. Repeated keys are fetched
    /// once and their value is repeated at every position they occupy.
    async fn batch_get(&self, keys: &[String]) -> CacheResult<Vec<Option<Value>>>;

    /// Deletes all keys in one pipelined round trip.
    async fn batch_delete(&self, keys: &[String]) -> CacheResult<()>;
}

/// Typed convenience methods over [`CacheService`].
#[async_trait]
pub trait CacheServiceExt: CacheService {
    /// Serializes `value` and stores it under `key`.
    async fn save_as<T: Serialize + Sync>(&self, key: &str, value: &T) -> CacheResult<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| typed_error(CacheOperation::Save, KeyContext::key(key), e))?;
        self.save(key, &value).await
    }

    /// Gets the value under `key` as a `T`.
    async fn get_as<T: DeserializeOwned + Send>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| typed_error(CacheOperation::Get, KeyContext::key(key), e)),
            None => Ok(None),
        }
    }

    /// Batch-gets values as `T`, keeping positions.
    async fn batch_get_as<T: DeserializeOwned + Send>(
        &self,
        keys: &[String],
    ) -> CacheResult<Vec<Option<T>>> {
        self.batch_get(keys)
            .await?
            .into_iter()
            .map(|slot| slot.map(serde_json::from_value).transpose())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| typed_error(CacheOperation::BatchGet, KeyContext::keys(keys.iter().cloned()), e))
    }
}

impl<S: CacheService + ?Sized> CacheServiceExt for S {}

fn typed_error(operation: CacheOperation, context: KeyContext, err: serde_json::Error) -> CacheError {
    CacheError::backend(operation, context, BackendError::Serialization(err))
}
