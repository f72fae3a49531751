use crate::domain::{
    id::{BoardId, ListId},
    task::Task,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lists every new board starts with, in display order
pub const DEFAULT_LIST_TITLES: [&str; 3] = ["To Do", "In Progress", "Done"];

/// An ordered column of tasks within a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: ListId,
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskList {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A kanban board with its lists and tasks, nested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub lists: Vec<TaskList>,
}

impl Board {
    /// Total number of tasks across all lists
    pub fn task_count(&self) -> usize {
        self.lists.iter().map(TaskList::len).sum()
    }

    pub fn list(&self, id: &ListId) -> Option<&TaskList> {
        self.lists.iter().find(|list| &list.id == id)
    }

    pub fn list_by_title(&self, title: &str) -> Option<&TaskList> {
        self.lists.iter().find(|list| list.title == title)
    }
}
