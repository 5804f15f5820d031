#![forbid(unsafe_code)]

//! Storage access layer: one trait, two backends. `SqliteTaskStore` is the
//! real store; `MemoryTaskStore` backs tests. Every operation is scoped by
//! owner, and "not found" and "not owned" collapse into the same absent
//! result so callers cannot tell them apart.

use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use smarttask_model::{OwnerId, Patch, Subtask, SubtaskId, Task, TaskId, Timestamp};

mod memory;
mod sqlite;

pub use memory::MemoryTaskStore;
pub use sqlite::SqliteTaskStore;

pub const CRATE_NAME: &str = "smarttask-store";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorCode {
    Io,
    Corrupt,
    Internal,
}

impl StoreErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "io_error",
            Self::Corrupt => "corrupt_row",
            Self::Internal => "internal_error",
        }
    }
}

/// A storage fault. Never produced for a plain miss; those are `None`/`false`
/// results on the trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::new(StoreErrorCode::Internal, err.to_string())
    }
}

/// Owner-scoped persistence for tasks and subtasks.
///
/// Mutations that touch a subtask re-check the parent task's ownership in
/// the same atomic step as the write, so a concurrent parent delete cannot
/// interleave between check and mutation.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks owned by `owner`, newest-created first, subtasks attached
    /// oldest-first.
    async fn list_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>, StoreError>;

    /// The task iff both id and owner match, subtasks attached.
    async fn get_task(&self, task_id: &TaskId, owner: &OwnerId)
        -> Result<Option<Task>, StoreError>;

    async fn insert_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Applies the patch only when the task is owned by `owner`; absent
    /// otherwise, with no write attempted. Returns the updated task.
    async fn update_task(
        &self,
        task_id: &TaskId,
        owner: &OwnerId,
        patch: &Patch,
        updated_at: Timestamp,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns whether a row was removed. Subtasks of a removed task are
    /// removed with it.
    async fn delete_task(&self, task_id: &TaskId, owner: &OwnerId) -> Result<bool, StoreError>;

    /// Inserts the subtask iff its parent task exists and is owned by
    /// `owner`; returns `false` (and writes nothing) otherwise.
    async fn insert_subtask(&self, subtask: &Subtask, owner: &OwnerId)
        -> Result<bool, StoreError>;

    /// Ownership is transitive through the parent task.
    async fn update_subtask(
        &self,
        subtask_id: &SubtaskId,
        owner: &OwnerId,
        patch: &Patch,
        updated_at: Timestamp,
    ) -> Result<Option<Subtask>, StoreError>;

    async fn delete_subtask(
        &self,
        subtask_id: &SubtaskId,
        owner: &OwnerId,
    ) -> Result<bool, StoreError>;
}
