use crate::{
    domain::{Board, BoardId, ListId, NewTask, Task, TaskId},
    error::Result,
    storage::Storage,
    store::{board_state::BoardState, slot::StateSlot},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// The single source of truth for boards, lists and tasks.
///
/// Construct one with [`BoardStore::open`] at startup and hand it to
/// consumers by reference. Each successful operation publishes a new
/// [`BoardState`] snapshot to subscribers and mirrors it to storage.
/// Operations that find no target return the error and change nothing.
pub struct BoardStore {
    slot: StateSlot<BoardState>,
}

impl BoardStore {
    /// Opens the store, restoring whatever was persisted under `key`
    pub async fn open(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            slot: StateSlot::open(storage, key.into()).await,
        }
    }

    pub fn storage_key(&self) -> &str {
        self.slot.key()
    }

    /// The current state. Later mutations do not affect a snapshot
    /// already handed out.
    pub fn snapshot(&self) -> Arc<BoardState> {
        self.slot.current()
    }

    /// Receives every state published after a successful mutation
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardState>> {
        self.slot.subscribe()
    }

    pub fn boards(&self) -> Vec<Board> {
        self.snapshot().boards()
    }

    pub fn board(&self, board_id: &BoardId) -> Option<Board> {
        self.snapshot().board(board_id)
    }

    pub fn active_board(&self) -> Option<Board> {
        self.snapshot().active_board()
    }

    async fn apply<T>(
        &mut self,
        operation: &'static str,
        change: impl FnOnce(&mut BoardState) -> Result<T>,
    ) -> Result<T> {
        let mut next = self.slot.draft();
        match change(&mut next) {
            Ok(value) => {
                debug!(operation, "board state updated");
                self.slot.commit(next).await;
                Ok(value)
            }
            Err(err) => {
                debug!(operation, error = %err, "board operation ignored");
                Err(err)
            }
        }
    }

    pub async fn create_board(&mut self, title: impl Into<String>) -> BoardId {
        let title = title.into();
        let mut next = self.slot.draft();
        let board_id = next.create_board(title);
        debug!(board_id = %board_id, "board created");
        self.slot.commit(next).await;
        board_id
    }

    pub async fn update_board(&mut self, board_id: &BoardId, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        self.apply("update_board", |state| state.update_board(board_id, title))
            .await
    }

    pub async fn delete_board(&mut self, board_id: &BoardId) -> Result<()> {
        self.apply("delete_board", |state| state.delete_board(board_id))
            .await
    }

    /// Activates `board_id`, or clears the active board if it does not
    /// exist. Returns whether the board exists.
    pub async fn set_active_board(&mut self, board_id: &BoardId) -> bool {
        let mut next = self.slot.draft();
        let found = next.set_active_board(board_id);

        if next.active_board_id() != self.snapshot().active_board_id() {
            self.slot.commit(next).await;
        }
        found
    }

    pub async fn create_list(&mut self, board_id: &BoardId, title: impl Into<String>) -> Result<ListId> {
        let title = title.into();
        self.apply("create_list", |state| state.create_list(board_id, title))
            .await
    }

    pub async fn update_list(
        &mut self,
        board_id: &BoardId,
        list_id: &ListId,
        title: impl Into<String>,
    ) -> Result<()> {
        let title = title.into();
        self.apply("update_list", |state| {
            state.update_list(board_id, list_id, title)
        })
        .await
    }

    pub async fn delete_list(&mut self, board_id: &BoardId, list_id: &ListId) -> Result<()> {
        self.apply("delete_list", |state| state.delete_list(board_id, list_id))
            .await
    }

    pub async fn create_task(
        &mut self,
        board_id: &BoardId,
        list_id: &ListId,
        fields: NewTask,
    ) -> Result<TaskId> {
        self.apply("create_task", |state| {
            state.create_task(board_id, list_id, fields)
        })
        .await
    }

    pub async fn update_task(&mut self, board_id: &BoardId, list_id: &ListId, task: Task) -> Result<()> {
        self.apply("update_task", |state| state.update_task(board_id, list_id, task))
            .await
    }

    pub async fn delete_task(
        &mut self,
        board_id: &BoardId,
        list_id: &ListId,
        task_id: &TaskId,
    ) -> Result<()> {
        self.apply("delete_task", |state| {
            state.delete_task(board_id, list_id, task_id)
        })
        .await
    }

    /// Moves a task to the end of another list on the same board.
    /// Same-list moves are rejected.
    pub async fn move_task(
        &mut self,
        board_id: &BoardId,
        source_list_id: &ListId,
        destination_list_id: &ListId,
        task_id: &TaskId,
    ) -> Result<()> {
        self.apply("move_task", |state| {
            state.move_task(board_id, source_list_id, destination_list_id, task_id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::Priority,
        error::TaskflowError,
        storage::{load_json, MemoryStorage},
        store::board_state::BoardsSnapshot,
    };
    use async_trait::async_trait;

    const KEY: &str = "board-storage";

    async fn open_store() -> (Arc<MemoryStorage>, BoardStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = BoardStore::open(storage.clone(), KEY).await;
        (storage, store)
    }

    fn list_named(board: &Board, title: &str) -> ListId {
        board.list_by_title(title).unwrap().id
    }

    /// Reads fine, fails every write
    struct ReadOnlyStorage;

    #[async_trait]
    impl Storage for ReadOnlyStorage {
        async fn read(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn write(&self, _key: &str, _contents: &str) -> Result<()> {
            Err(TaskflowError::StorageError("quota exceeded".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_open_empty() {
        let (_, store) = open_store().await;
        assert!(store.boards().is_empty());
        assert!(store.active_board().is_none());
        assert_eq!(store.storage_key(), KEY);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let (storage, mut store) = open_store().await;

        let board_id = store.create_board("Launch").await;
        let board = store.active_board().unwrap();
        let todo = list_named(&board, "To Do");
        store
            .create_task(&board_id, &todo, NewTask::new("Announce"))
            .await
            .unwrap();

        let persisted: BoardsSnapshot = load_json(storage.as_ref(), KEY).await.unwrap().unwrap();
        assert_eq!(persisted, store.snapshot().to_snapshot());
        assert_eq!(persisted.boards[0].task_count(), 1);
        assert_eq!(persisted.active_board.unwrap().id, board_id);
    }

    #[tokio::test]
    async fn test_reopen_restores_state() {
        let (storage, mut store) = open_store().await;
        let board_id = store.create_board("Persistent").await;
        let doing = store.create_list(&board_id, "Doing").await.unwrap();
        store
            .create_task(&board_id, &doing, NewTask::new("Survive restart"))
            .await
            .unwrap();

        let reopened = BoardStore::open(storage, KEY).await;

        assert_eq!(*reopened.snapshot(), *store.snapshot());
        assert_eq!(reopened.active_board().unwrap().id, board_id);
    }

    #[tokio::test]
    async fn test_corrupt_storage_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(KEY, "{\"boards\": [{\"id\": 42}]}").await.unwrap();

        let mut store = BoardStore::open(storage.clone(), KEY).await;
        assert!(store.boards().is_empty());

        // The next mutation overwrites the corrupt blob
        store.create_board("Fresh").await;
        let persisted: BoardsSnapshot = load_json(storage.as_ref(), KEY).await.unwrap().unwrap();
        assert_eq!(persisted.boards.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_mutation() {
        let mut store = BoardStore::open(Arc::new(ReadOnlyStorage), KEY).await;

        let board_id = store.create_board("Unsaved").await;
        store.update_board(&board_id, "Still applied").await.unwrap();

        assert_eq!(store.active_board().unwrap().title, "Still applied");
    }

    #[tokio::test]
    async fn test_subscribers_see_each_mutation() {
        let (_, mut store) = open_store().await;
        let mut rx = store.subscribe();

        let board_id = store.create_board("Watched").await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().board_count(), 1);

        store.update_board(&board_id, "Renamed").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().active_board().unwrap().title,
            "Renamed"
        );
    }

    #[tokio::test]
    async fn test_ignored_operations_do_not_publish_or_persist() {
        let (storage, mut store) = open_store().await;
        let board_id = store.create_board("Board").await;
        let stored_before = storage.read(KEY).await.unwrap();
        let rx = store.subscribe();

        let result = store.update_board(&BoardId::new(), "Nope").await;
        assert!(matches!(result, Err(TaskflowError::BoardNotFound(_))));

        let result = store.delete_list(&board_id, &ListId::new()).await;
        assert!(matches!(result, Err(TaskflowError::ListNotFound(_))));

        assert!(!rx.has_changed().unwrap());
        assert_eq!(storage.read(KEY).await.unwrap(), stored_before);
    }

    #[tokio::test]
    async fn test_held_snapshot_is_not_affected_by_later_mutations() {
        let (_, mut store) = open_store().await;
        let board_id = store.create_board("Before").await;
        let held = store.snapshot();

        store.update_board(&board_id, "After").await.unwrap();
        store.create_board("Another").await;

        assert_eq!(held.board_count(), 1);
        assert_eq!(held.active_board().unwrap().title, "Before");
        assert_eq!(store.snapshot().board_count(), 2);
    }

    #[tokio::test]
    async fn test_set_active_board() {
        let (_, mut store) = open_store().await;
        let first = store.create_board("First").await;
        store.create_board("Second").await;

        assert!(store.set_active_board(&first).await);
        assert_eq!(store.active_board().unwrap().id, first);

        assert!(!store.set_active_board(&BoardId::new()).await);
        assert!(store.active_board().is_none());
    }

    #[tokio::test]
    async fn test_delete_active_board() {
        let (storage, mut store) = open_store().await;
        let board_id = store.create_board("Doomed").await;

        store.delete_board(&board_id).await.unwrap();

        assert!(store.active_board().is_none());
        let persisted: BoardsSnapshot = load_json(storage.as_ref(), KEY).await.unwrap().unwrap();
        assert!(persisted.boards.is_empty());
        assert!(persisted.active_board.is_none());
    }

    #[tokio::test]
    async fn test_sprint_scenario() {
        let (_, mut store) = open_store().await;
        let board_id = store.create_board("Sprint 1").await;
        let backlog = store.create_list(&board_id, "Backlog").await.unwrap();
        let task_id = store
            .create_task(
                &board_id,
                &backlog,
                NewTask::new("Fix bug").with_priority(Priority::High),
            )
            .await
            .unwrap();
        let doing = store.create_list(&board_id, "Doing").await.unwrap();

        store
            .move_task(&board_id, &backlog, &doing, &task_id)
            .await
            .unwrap();

        let board = store.active_board().unwrap();
        assert!(board.list(&backlog).unwrap().is_empty());
        let doing = board.list(&doing).unwrap();
        assert_eq!(doing.len(), 1);
        assert_eq!(doing.tasks[0].title, "Fix bug");
        assert_eq!(doing.tasks[0].priority, Priority::High);
        assert_eq!(store.board(&board_id), Some(board));
    }

    #[tokio::test]
    async fn test_task_edit_and_delete() {
        let (_, mut store) = open_store().await;
        let board_id = store.create_board("Board").await;
        let todo = list_named(&store.active_board().unwrap(), "To Do");
        let task_id = store
            .create_task(&board_id, &todo, NewTask::new("Draft"))
            .await
            .unwrap();

        let mut task = store.active_board().unwrap().lists[0].tasks[0].clone();
        task.description = "Now with details".to_string();
        store.update_task(&board_id, &todo, task).await.unwrap();
        assert_eq!(
            store.active_board().unwrap().lists[0].tasks[0].description,
            "Now with details"
        );

        store.update_list(&board_id, &todo, "Backlog").await.unwrap();
        store.delete_task(&board_id, &todo, &task_id).await.unwrap();

        let board = store.active_board().unwrap();
        assert_eq!(board.lists[0].title, "Backlog");
        assert_eq!(board.task_count(), 0);
    }
}
