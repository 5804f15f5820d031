// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use smarttask_model::{OwnerId, Patch, Subtask, SubtaskId, Task, TaskId, Timestamp};
use tokio::sync::Mutex;

use crate::{StoreError, StoreErrorCode, TaskStore};

/// In-memory fake with the same contract as the SQLite store. Tasks are kept
/// in creation order and carry their subtasks inline; the mutex is held
/// across each whole operation, which gives the fake the same
/// check-then-mutate atomicity as the real transactions.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
    fail: AtomicBool,
}

impl MemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every operation fails with an internal storage error. Used
    /// by handler tests exercising the 500 path.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    fn check_fail(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::Relaxed) {
            Err(StoreError::new(
                StoreErrorCode::Internal,
                "injected storage fault",
            ))
        } else {
            Ok(())
        }
    }
}

/// The single ownership predicate for this backend; both the task and the
/// transitive subtask paths go through it.
fn owns_task(task: &Task, owner: &OwnerId) -> bool {
    &task.user_id == owner
}

fn apply_patch(title: &mut String, completed: &mut bool, patch: &Patch) {
    if let Some(new_title) = &patch.title {
        *title = new_title.clone();
    }
    if let Some(new_completed) = patch.completed {
        *completed = new_completed;
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>, StoreError> {
        self.check_fail()?;
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .iter()
            .rev()
            .filter(|t| owns_task(t, owner))
            .cloned()
            .collect())
    }

    async fn get_task(
        &self,
        task_id: &TaskId,
        owner: &OwnerId,
    ) -> Result<Option<Task>, StoreError> {
        self.check_fail()?;
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .iter()
            .find(|t| &t.id == task_id && owns_task(t, owner))
            .cloned())
    }

    async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.check_fail()?;
        self.tasks.lock().await.push(task.clone());
        Ok(())
    }

    async fn update_task(
        &self,
        task_id: &TaskId,
        owner: &OwnerId,
        patch: &Patch,
        updated_at: Timestamp,
    ) -> Result<Option<Task>, StoreError> {
        self.check_fail()?;
        let mut tasks = self.tasks.lock().await;
        let Some(task) = tasks
            .iter_mut()
            .find(|t| &t.id == task_id && owns_task(t, owner))
        else {
            return Ok(None);
        };
        apply_patch(&mut task.title, &mut task.completed, patch);
        task.updated_at = updated_at;
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, task_id: &TaskId, owner: &OwnerId) -> Result<bool, StoreError> {
        self.check_fail()?;
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| !(&t.id == task_id && owns_task(t, owner)));
        Ok(tasks.len() < before)
    }

    async fn insert_subtask(
        &self,
        subtask: &Subtask,
        owner: &OwnerId,
    ) -> Result<bool, StoreError> {
        self.check_fail()?;
        let mut tasks = self.tasks.lock().await;
        let Some(parent) = tasks
            .iter_mut()
            .find(|t| t.id == subtask.task_id && owns_task(t, owner))
        else {
            return Ok(false);
        };
        parent.subtasks.push(subtask.clone());
        Ok(true)
    }

    async fn update_subtask(
        &self,
        subtask_id: &SubtaskId,
        owner: &OwnerId,
        patch: &Patch,
        updated_at: Timestamp,
    ) -> Result<Option<Subtask>, StoreError> {
        self.check_fail()?;
        let mut tasks = self.tasks.lock().await;
        for task in tasks.iter_mut().filter(|t| owns_task(t, owner)) {
            if let Some(sub) = task.subtasks.iter_mut().find(|s| &s.id == subtask_id) {
                apply_patch(&mut sub.title, &mut sub.completed, patch);
                sub.updated_at = updated_at;
                return Ok(Some(sub.clone()));
            }
        }
        Ok(None)
    }

    async fn delete_subtask(
        &self,
        subtask_id: &SubtaskId,
        owner: &OwnerId,
    ) -> Result<bool, StoreError> {
        self.check_fail()?;
        let mut tasks = self.tasks.lock().await;
        for task in tasks.iter_mut().filter(|t| owns_task(t, owner)) {
            let before = task.subtasks.len();
            task.subtasks.retain(|s| &s.id != subtask_id);
            if task.subtasks.len() < before {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
