//! # TaskFlow Core
//!
//! State stores and domain models for the TaskFlow kanban board.
//!
//! The [`BoardStore`] owns the board → list → task hierarchy and is the
//! single source of truth for it; the [`SessionStore`] tracks who is signed
//! in. Both publish immutable snapshots to subscribers and mirror their
//! state to a [`Storage`] backend after every change.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::StoreConfig;
pub use domain::{
    board::{Board, TaskList},
    id::{BoardId, ListId, TaskId},
    identity::{Identity, Role},
    task::{NewTask, Priority, Task},
};
pub use error::{Result, TaskflowError};
pub use storage::Storage;
pub use store::{BoardState, BoardStore, SessionState, SessionStore};
