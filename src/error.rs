use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskflowError>;

#[derive(Debug, Error)]
pub enum TaskflowError {
    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task {0} is already in the destination list")]
    SameListMove(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Email and password are required")]
    InvalidCredentials,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid storage key: {0}")]
    InvalidStorageKey(String),

    #[error("Board and session stores share the storage key: {0}")]
    SharedStorageKey(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

impl TaskflowError {
    /// True for the "target does not exist" family, i.e. operations that
    /// were ignored and left the state untouched.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BoardNotFound(_) | Self::ListNotFound(_) | Self::TaskNotFound(_)
        )
    }
}
