use crate::{
    error::Result,
    storage::{validate_key, Storage},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File-based storage: one JSON file per key under a root directory
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const EXTENSION: &'static str = "json";
    const TEMP_EXTENSION: &'static str = "json.tmp";

    /// Creates a new FileStorage rooted at `root`. The directory is created
    /// on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_path: root.as_ref().to_path_buf(),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn slot_file(&self, key: &str) -> PathBuf {
        self.root_path.join(format!("{}.{}", key, Self::EXTENSION))
    }

    fn temp_file(&self, key: &str) -> PathBuf {
        self.root_path.join(format!("{}.{}", key, Self::TEMP_EXTENSION))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let file_path = self.slot_file(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(Some(contents))
    }

    async fn write(&self, key: &str, contents: &str) -> Result<()> {
        validate_key(key)?;
        self.ensure_directory_exists(&self.root_path).await?;

        // Write to a temp file then rename, so readers never see a partial file
        let temp_path = self.temp_file(key);
        fs::write(&temp_path, contents).await?;
        fs::rename(&temp_path, self.slot_file(key)).await?;

        debug!(key, bytes = contents.len(), "wrote storage slot");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let file_path = self.slot_file(key);

        if file_path.exists() {
            fs::remove_file(file_path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(storage.read("board-storage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join(".taskflow");
        let storage = FileStorage::new(&root);

        storage.write("board-storage", "{\"boards\":[]}").await.unwrap();

        assert!(root.join("board-storage.json").exists());
        assert!(!root.join("board-storage.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.write("auth-storage", "first").await.unwrap();
        storage.write("auth-storage", "second").await.unwrap();

        let contents = storage.read("auth-storage").await.unwrap();
        assert_eq!(contents.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.write("board-storage", "boards").await.unwrap();
        storage.write("auth-storage", "session").await.unwrap();

        assert_eq!(
            storage.read("board-storage").await.unwrap().as_deref(),
            Some("boards")
        );
        assert_eq!(
            storage.read("auth-storage").await.unwrap().as_deref(),
            Some("session")
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.write("board-storage", "{}").await.unwrap();
        storage.remove("board-storage").await.unwrap();
        assert!(storage.read("board-storage").await.unwrap().is_none());

        storage.remove("board-storage").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        assert!(storage.write("../outside", "{}").await.is_err());
        assert!(storage.read("a/b").await.is_err());
    }
}
