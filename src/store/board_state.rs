//! Board hierarchy state and its transitions.
//!
//! Boards, lists and tasks live in three id-indexed tables. Lists and tasks
//! carry a back-reference to their parent; parents keep the ordered child
//! ids. The active board is held as an id only and the nested [`Board`]
//! view is derived on read, so it always reflects the primary collection.
//!
//! Every transition either succeeds or returns an error with the state left
//! untouched: all lookups happen before the first write.

use crate::{
    domain::{Board, BoardId, ListId, NewTask, Task, TaskId, TaskList, DEFAULT_LIST_TITLES},
    error::{Result, TaskflowError},
    store::slot::Persistable,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
struct BoardRecord {
    id: BoardId,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    lists: Vec<ListId>,
}

impl BoardRecord {
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ListRecord {
    id: ListId,
    board_id: BoardId,
    title: String,
    tasks: Vec<TaskId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TaskRecord {
    list_id: ListId,
    task: Task,
}

/// Persisted layout of the board store: the nested board collection plus
/// the active board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardsSnapshot {
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub active_board: Option<Board>,
}

/// Full state of the board hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    order: Vec<BoardId>,
    boards: HashMap<BoardId, BoardRecord>,
    lists: HashMap<ListId, ListRecord>,
    tasks: HashMap<TaskId, TaskRecord>,
    active: Option<BoardId>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- lookups -------------------------------------------------------

    fn board_record(&self, board_id: &BoardId) -> Result<&BoardRecord> {
        self.boards
            .get(board_id)
            .ok_or_else(|| TaskflowError::BoardNotFound(board_id.to_string()))
    }

    fn board_record_mut(&mut self, board_id: &BoardId) -> Result<&mut BoardRecord> {
        self.boards
            .get_mut(board_id)
            .ok_or_else(|| TaskflowError::BoardNotFound(board_id.to_string()))
    }

    /// Resolves a list that must belong to `board_id`
    fn list_record(&self, board_id: &BoardId, list_id: &ListId) -> Result<&ListRecord> {
        self.board_record(board_id)?;
        self.lists
            .get(list_id)
            .filter(|list| &list.board_id == board_id)
            .ok_or_else(|| TaskflowError::ListNotFound(list_id.to_string()))
    }

    fn list_record_mut(&mut self, list_id: &ListId) -> Result<&mut ListRecord> {
        self.lists
            .get_mut(list_id)
            .ok_or_else(|| TaskflowError::ListNotFound(list_id.to_string()))
    }

    /// Checks that `task_id` currently sits in `list_id` of `board_id`
    fn ensure_task_in_list(
        &self,
        board_id: &BoardId,
        list_id: &ListId,
        task_id: &TaskId,
    ) -> Result<()> {
        self.list_record(board_id, list_id)?;
        match self.tasks.get(task_id) {
            Some(record) if &record.list_id == list_id => Ok(()),
            _ => Err(TaskflowError::TaskNotFound(task_id.to_string())),
        }
    }

    fn task_record_mut(&mut self, task_id: &TaskId) -> Result<&mut TaskRecord> {
        self.tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskflowError::TaskNotFound(task_id.to_string()))
    }

    fn materialize(&self, record: &BoardRecord) -> Board {
        let lists = record
            .lists
            .iter()
            .filter_map(|list_id| self.lists.get(list_id))
            .map(|list| TaskList {
                id: list.id,
                title: list.title.clone(),
                tasks: list
                    .tasks
                    .iter()
                    .filter_map(|task_id| self.tasks.get(task_id))
                    .map(|record| record.task.clone())
                    .collect(),
            })
            .collect();

        Board {
            id: record.id,
            title: record.title.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            lists,
        }
    }

    // ---- reads ---------------------------------------------------------

    /// All boards, nested, in creation order
    pub fn boards(&self) -> Vec<Board> {
        self.order
            .iter()
            .filter_map(|id| self.boards.get(id))
            .map(|record| self.materialize(record))
            .collect()
    }

    pub fn board(&self, board_id: &BoardId) -> Option<Board> {
        self.boards
            .get(board_id)
            .map(|record| self.materialize(record))
    }

    pub fn board_ids(&self) -> &[BoardId] {
        &self.order
    }

    pub fn board_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn active_board_id(&self) -> Option<BoardId> {
        self.active
    }

    /// The active board, derived from the primary collection
    pub fn active_board(&self) -> Option<Board> {
        self.active.as_ref().and_then(|id| self.board(id))
    }

    /// Finds a task on a board along with the list that holds it
    pub fn find_task(&self, board_id: &BoardId, task_id: &TaskId) -> Option<(ListId, &Task)> {
        let record = self.tasks.get(task_id)?;
        let list = self.lists.get(&record.list_id)?;
        (&list.board_id == board_id).then_some((record.list_id, &record.task))
    }

    /// Tasks on a board whose title or description contains `query`,
    /// case-insensitive, in board order
    pub fn search_tasks(&self, board_id: &BoardId, query: &str) -> Vec<Task> {
        let Some(board) = self.boards.get(board_id) else {
            return Vec::new();
        };

        board
            .lists
            .iter()
            .filter_map(|list_id| self.lists.get(list_id))
            .flat_map(|list| list.tasks.iter())
            .filter_map(|task_id| self.tasks.get(task_id))
            .map(|record| &record.task)
            .filter(|task| task.matches(query))
            .cloned()
            .collect()
    }

    // ---- boards --------------------------------------------------------

    /// Appends a board with the default lists and makes it active
    pub fn create_board(&mut self, title: impl Into<String>) -> BoardId {
        let now = Utc::now();
        let board_id = BoardId::new();

        let lists = DEFAULT_LIST_TITLES
            .iter()
            .map(|title| {
                let list = ListRecord {
                    id: ListId::new(),
                    board_id,
                    title: title.to_string(),
                    tasks: Vec::new(),
                };
                let list_id = list.id;
                self.lists.insert(list_id, list);
                list_id
            })
            .collect();

        self.boards.insert(
            board_id,
            BoardRecord {
                id: board_id,
                title: title.into(),
                created_at: now,
                updated_at: now,
                lists,
            },
        );
        self.order.push(board_id);
        self.active = Some(board_id);
        board_id
    }

    pub fn update_board(&mut self, board_id: &BoardId, title: impl Into<String>) -> Result<()> {
        let board = self.board_record_mut(board_id)?;
        board.title = title.into();
        board.touch(Utc::now());
        Ok(())
    }

    /// Removes a board with all of its lists and tasks
    pub fn delete_board(&mut self, board_id: &BoardId) -> Result<()> {
        let board = self
            .boards
            .remove(board_id)
            .ok_or_else(|| TaskflowError::BoardNotFound(board_id.to_string()))?;

        for list_id in &board.lists {
            self.discard_list(list_id);
        }
        self.order.retain(|id| id != board_id);
        if self.active.as_ref() == Some(board_id) {
            self.active = None;
        }
        Ok(())
    }

    /// Points the active board at `board_id`. An unknown id clears the
    /// active board. Returns whether the board exists.
    pub fn set_active_board(&mut self, board_id: &BoardId) -> bool {
        let found = self.boards.contains_key(board_id);
        self.active = found.then_some(*board_id);
        found
    }

    // ---- lists ---------------------------------------------------------

    pub fn create_list(&mut self, board_id: &BoardId, title: impl Into<String>) -> Result<ListId> {
        let board = self.board_record_mut(board_id)?;
        let list_id = ListId::new();
        board.lists.push(list_id);
        board.touch(Utc::now());

        self.lists.insert(
            list_id,
            ListRecord {
                id: list_id,
                board_id: *board_id,
                title: title.into(),
                tasks: Vec::new(),
            },
        );
        Ok(list_id)
    }

    /// Renames a list, keeping its position
    pub fn update_list(
        &mut self,
        board_id: &BoardId,
        list_id: &ListId,
        title: impl Into<String>,
    ) -> Result<()> {
        self.list_record(board_id, list_id)?;

        self.list_record_mut(list_id)?.title = title.into();
        self.board_record_mut(board_id)?.touch(Utc::now());
        Ok(())
    }

    /// Removes a list together with its tasks
    pub fn delete_list(&mut self, board_id: &BoardId, list_id: &ListId) -> Result<()> {
        self.list_record(board_id, list_id)?;

        let board = self.board_record_mut(board_id)?;
        board.lists.retain(|id| id != list_id);
        board.touch(Utc::now());
        self.discard_list(list_id);
        Ok(())
    }

    fn discard_list(&mut self, list_id: &ListId) {
        if let Some(list) = self.lists.remove(list_id) {
            for task_id in &list.tasks {
                self.tasks.remove(task_id);
            }
        }
    }

    // ---- tasks ---------------------------------------------------------

    /// Appends a new task to the end of a list
    pub fn create_task(
        &mut self,
        board_id: &BoardId,
        list_id: &ListId,
        fields: NewTask,
    ) -> Result<TaskId> {
        self.list_record(board_id, list_id)?;

        let now = Utc::now();
        let task = Task::create(fields, now);
        let task_id = task.id;

        self.list_record_mut(list_id)?.tasks.push(task_id);
        self.tasks.insert(
            task_id,
            TaskRecord {
                list_id: *list_id,
                task,
            },
        );
        self.board_record_mut(board_id)?.touch(now);
        Ok(task_id)
    }

    /// Replaces the editable fields of the task with `task.id` in the given
    /// list. `created_at` is kept and `updated_at` is set to now.
    pub fn update_task(&mut self, board_id: &BoardId, list_id: &ListId, task: Task) -> Result<()> {
        let task_id = task.id;
        self.ensure_task_in_list(board_id, list_id, &task_id)?;

        let now = Utc::now();
        self.task_record_mut(&task_id)?.task.apply_edit(task, now);
        self.board_record_mut(board_id)?.touch(now);
        Ok(())
    }

    pub fn delete_task(&mut self, board_id: &BoardId, list_id: &ListId, task_id: &TaskId) -> Result<()> {
        self.ensure_task_in_list(board_id, list_id, task_id)?;

        self.list_record_mut(list_id)?.tasks.retain(|id| id != task_id);
        self.tasks.remove(task_id);
        self.board_record_mut(board_id)?.touch(Utc::now());
        Ok(())
    }

    /// Moves a task from the source list to the end of the destination
    /// list in one step.
    ///
    /// Fails without changes if the board, either list, or the task in the
    /// source list is missing, and rejects moves within a single list.
    pub fn move_task(
        &mut self,
        board_id: &BoardId,
        source_list_id: &ListId,
        destination_list_id: &ListId,
        task_id: &TaskId,
    ) -> Result<()> {
        self.ensure_task_in_list(board_id, source_list_id, task_id)?;
        if source_list_id == destination_list_id {
            return Err(TaskflowError::SameListMove(task_id.to_string()));
        }
        self.list_record(board_id, destination_list_id)?;

        let now = Utc::now();
        self.list_record_mut(source_list_id)?
            .tasks
            .retain(|id| id != task_id);
        self.list_record_mut(destination_list_id)?.tasks.push(*task_id);

        let record = self.task_record_mut(task_id)?;
        record.list_id = *destination_list_id;
        record.task.touch(now);

        self.board_record_mut(board_id)?.touch(now);
        Ok(())
    }

    // ---- persistence ---------------------------------------------------

    pub fn to_snapshot(&self) -> BoardsSnapshot {
        BoardsSnapshot {
            boards: self.boards(),
            active_board: self.active_board(),
        }
    }

    /// Rebuilds the state from its persisted layout.
    ///
    /// Entities whose id was already seen are skipped. The active board is
    /// restored by id only and dropped if that board is not in the
    /// collection.
    pub fn from_snapshot(snapshot: BoardsSnapshot) -> Self {
        let mut state = Self::default();
        let mut seen_lists = HashSet::new();
        let mut seen_tasks = HashSet::new();

        for board in snapshot.boards {
            if state.boards.contains_key(&board.id) {
                warn!(board_id = %board.id, "skipping duplicate board in snapshot");
                continue;
            }

            let mut list_ids = Vec::with_capacity(board.lists.len());
            for list in board.lists {
                if !seen_lists.insert(list.id) {
                    warn!(list_id = %list.id, "skipping duplicate list in snapshot");
                    continue;
                }

                let mut task_ids = Vec::with_capacity(list.tasks.len());
                for task in list.tasks {
                    if !seen_tasks.insert(task.id) {
                        warn!(task_id = %task.id, "skipping duplicate task in snapshot");
                        continue;
                    }
                    task_ids.push(task.id);
                    state.tasks.insert(
                        task.id,
                        TaskRecord {
                            list_id: list.id,
                            task,
                        },
                    );
                }

                list_ids.push(list.id);
                state.lists.insert(
                    list.id,
                    ListRecord {
                        id: list.id,
                        board_id: board.id,
                        title: list.title,
                        tasks: task_ids,
                    },
                );
            }

            state.order.push(board.id);
            state.boards.insert(
                board.id,
                BoardRecord {
                    id: board.id,
                    title: board.title,
                    created_at: board.created_at,
                    updated_at: board.updated_at,
                    lists: list_ids,
                },
            );
        }

        state.active = snapshot
            .active_board
            .map(|board| board.id)
            .filter(|id| state.boards.contains_key(id));
        state
    }
}

impl Persistable for BoardState {
    type Snapshot = BoardsSnapshot;

    fn to_snapshot(&self) -> BoardsSnapshot {
        BoardState::to_snapshot(self)
    }

    fn from_snapshot(snapshot: BoardsSnapshot) -> Self {
        BoardState::from_snapshot(snapshot)
    }
}
