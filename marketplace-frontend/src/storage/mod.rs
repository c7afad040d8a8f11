//! Durable key-value storage backing the persisted client stores.
//!
//! Values are written as JSON. Reads parse JSON first and fall back to the
//! raw text so legacy values written without JSON encoding still load.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode storage file: {0}")]
    Encode(#[source] serde_json::Error),
}

#[async_trait]
pub trait DurableStorage: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Typed access on top of [`DurableStorage`].
#[async_trait]
pub trait StorageExt: DurableStorage {
    /// Read and decode `key`. Unreadable or undecodable values are logged and
    /// reported as absent.
    async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        let raw = match self.get_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read from storage");
                return None;
            }
        };

        decode_value(key, raw)
    }

    async fn set<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(key, encoded).await
    }
}

impl<S: DurableStorage + ?Sized> StorageExt for S {}

fn decode_value<T: DeserializeOwned>(key: &str, raw: String) -> Option<T> {
    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(json_err) => match serde_json::from_value::<T>(serde_json::Value::String(raw)) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key = %key, error = %json_err, "Discarding unparseable stored value");
                None
            }
        },
    }
}
