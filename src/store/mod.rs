pub mod board_state;
pub mod board_store;
pub mod session;
mod slot;

pub use board_state::{BoardState, BoardsSnapshot};
pub use board_store::BoardStore;
pub use session::{SessionState, SessionStore};
