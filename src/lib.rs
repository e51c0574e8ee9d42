//! Terminal client for a task board backed by a REST task store.
//!
//! The board mirrors the store's task collection in a [`cache::TaskCache`],
//! renders it into four column containers, and pushes drag/drop moves back
//! to the store through [`kanban_board::KanbanBoard::change_position`].

pub mod cache;
pub mod config;
pub mod drag;
pub mod error;
pub mod kanban_board;
pub mod logger;
pub mod render;
pub mod store;
pub mod summary;
pub mod task;
pub mod ui;

pub use error::BoardError;
pub use kanban_board::{KanbanBoard, SyncPolicy};
pub use store::{HttpTaskStore, TaskStore};
pub use task::{Position, Priority, Subtask, Task, TaskId};
