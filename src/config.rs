//! Store configuration.
//!
//! Read from an optional TOML file; a missing file or missing keys fall
//! back to the defaults:
//!
//! ```toml
//! data_dir = ".taskflow"
//! board_key = "board-storage"
//! session_key = "auth-storage"
//! ```

use crate::{
    error::{Result, TaskflowError},
    storage::{validate_key, Storage},
    store::{BoardStore, SessionStore},
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the persisted slots
    pub data_dir: PathBuf,
    /// Storage key of the board store
    pub board_key: String,
    /// Storage key of the session store
    pub session_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(Self::DEFAULT_DATA_DIR),
            board_key: Self::DEFAULT_BOARD_KEY.to_string(),
            session_key: Self::DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    pub const DEFAULT_DATA_DIR: &'static str = ".taskflow";
    pub const DEFAULT_BOARD_KEY: &'static str = "board-storage";
    pub const DEFAULT_SESSION_KEY: &'static str = "auth-storage";

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config file at `path`, or the defaults if it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    /// Both keys must be well-formed and distinct; one slot cannot hold
    /// both blobs.
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.board_key)?;
        validate_key(&self.session_key)?;
        if self.board_key == self.session_key {
            return Err(TaskflowError::SharedStorageKey(self.board_key.clone()));
        }
        Ok(())
    }

    #[cfg(feature = "file-storage")]
    pub fn file_storage(&self) -> crate::storage::FileStorage {
        crate::storage::FileStorage::new(&self.data_dir)
    }

    /// Opens both stores on a shared backend using the configured keys
    pub async fn open_stores(&self, storage: Arc<dyn Storage>) -> (BoardStore, SessionStore) {
        let boards = BoardStore::open(storage.clone(), self.board_key.clone()).await;
        let session = SessionStore::open(storage, self.session_key.clone()).await;
        (boards, session)
    }
}
