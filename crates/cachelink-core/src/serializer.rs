//! Key and value serializers.
//!
//! Every read and write path goes through one [`SerializerPair`], so a value
//! written by a single command and a value written in a pipeline are encoded
//! identically.

use crate::BackendError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Encodes keys to bytes and back.
pub trait KeySerializer: Send + Sync {
    fn serialize(&self, key: &str) -> Vec<u8>;

    fn deserialize(&self, bytes: &[u8]) -> Result<String, BackendError>;
}

/// Encodes values to bytes and back.
///
/// Implementations must be structured: a decoded value is equal to the value
/// that was encoded, whatever its shape.
pub trait ValueSerializer: Send + Sync {
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, BackendError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, BackendError>;
}

/// Plain UTF-8 key encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringKeySerializer;

impl KeySerializer for StringKeySerializer {
    fn serialize(&self, key: &str) -> Vec<u8> {
        key.as_bytes().to_vec()
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<String, BackendError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// JSON value encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValueSerializer;

impl ValueSerializer for JsonValueSerializer {
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, BackendError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, BackendError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// The key serializer and value serializer bound to a connection.
///
/// Cheap to clone; the serializers themselves are shared.
#[derive(Clone)]
pub struct SerializerPair {
    key: Arc<dyn KeySerializer>,
    value: Arc<dyn ValueSerializer>,
}

impl SerializerPair {
    #[must_use]
    pub fn new(key: Arc<dyn KeySerializer>, value: Arc<dyn ValueSerializer>) -> Self {
        Self { key, value }
    }

    #[must_use]
    pub fn key_serializer(&self) -> &Arc<dyn KeySerializer> {
        &self.key
    }

    #[must_use]
    pub fn value_serializer(&self) -> &Arc<dyn ValueSerializer> {
        &self.value
    }

    /// Serializer for hash fields; hashes use the value encoding for both
    /// field names and field values.
    #[must_use]
    pub fn hash_serializer(&self) -> &Arc<dyn ValueSerializer> {
        &self.value
    }

    pub fn serialize_key(&self, key: &str) -> Vec<u8> {
        self.key.serialize(key)
    }

    pub fn deserialize_key(&self, bytes: &[u8]) -> Result<String, BackendError> {
        self.key.deserialize(bytes)
    }

    pub fn serialize_value(&self, value: &Value) -> Result<Vec<u8>, BackendError> {
        self.value.serialize(value)
    }

    pub fn deserialize_value(&self, bytes: &[u8]) -> Result<Value, BackendError> {
        self.value.deserialize(bytes)
    }
}

impl Default for SerializerPair {
    fn default() -> Self {
        Self::new(Arc::new(StringKeySerializer), Arc::new(JsonValueSerializer))
    }
}

impl fmt::Debug for SerializerPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerPair").finish_non_exhaustive()
    }
}
