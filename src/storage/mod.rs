use crate::error::{Result, TaskflowError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Key-value slot storage for persisted store snapshots
#[async_trait]
pub trait Storage: Send + Sync {
    /// Reads the contents stored under `key`, or `None` if nothing is stored
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the contents stored under `key`
    async fn write(&self, key: &str, contents: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Keys become file names, so only `[A-Za-z0-9_-]` is accepted
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(TaskflowError::InvalidStorageKey(key.to_string()))
    }
}

/// Reads and deserializes the JSON value stored under `key`
pub async fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Result<Option<T>> {
    match storage.read(key).await? {
        Some(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        None => Ok(None),
    }
}

/// Serializes `value` as JSON and stores it under `key`
pub async fn save_json<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    storage.write(key, &json).await
}
