use crate::{
    error::Result,
    storage::{validate_key, Storage},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process storage; contents are lost when it is dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, contents: &str) -> Result<()> {
        validate_key(key)?;
        self.slots
            .write()
            .await
            .insert(key.to_string(), contents.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.slots.write().await.remove(key);
        Ok(())
    }
}
