pub mod board;
pub mod id;
pub mod identity;
pub mod sorting;
pub mod task;

pub use board::{Board, TaskList, DEFAULT_LIST_TITLES};
pub use id::{BoardId, ListId, TaskId};
pub use identity::{Identity, Role};
pub use sorting::{sort_tasks, SortField, SortOrder};
pub use task::{NewTask, Priority, Task};

use crate::error::{Result, TaskflowError};

/// Checks a board, list, or task title before it is handed to a store.
///
/// Stores accept any title; this is for callers that collect user input.
/// Returns the trimmed title.
pub fn validate_title(title: &str) -> Result<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskflowError::EmptyTitle);
    }
    Ok(trimmed)
}
