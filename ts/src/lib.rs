//! TaskStore - session-scoped task persistence
//!
//! Stores tasks and their subtasks in a single SQLite database. Every task
//! belongs to a session id; every read and write is filtered by it, and
//! subtasks are reached only through a task the session owns.
//!
//! # Example
//!
//! ```ignore
//! use taskstore::{NewTask, TaskStore};
//!
//! let store = TaskStore::open("tododata.db")?;
//! let id = store.create_task("3f9a...", &NewTask::new("Finish report"))?;
//! store.create_subtask("3f9a...", id, "Outline sections")?;
//! let tasks = store.list_tasks("3f9a...")?;
//! ```

mod schema;
mod store;

pub use store::{NewTask, SubtaskRecord, TaskId, TaskRecord, TaskStore};

/// Priority stored when a caller does not give one (medium)
pub const DEFAULT_PRIORITY: u8 = 2;

/// Category stored when a caller does not give one
pub const DEFAULT_CATEGORY: &str = "Other";
