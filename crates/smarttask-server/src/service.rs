// SPDX-License-Identifier: MIT OR Apache-2.0

//! The task/subtask service: sole authority for ownership enforcement and
//! persistence orchestration. Every operation takes the owner explicitly;
//! "not found" and "not owned" collapse into the same absent result, except
//! subtask creation, which surfaces an inaccessible parent distinctly so the
//! controller can answer 404 instead of 500.

use std::fmt;
use std::sync::Arc;

use smarttask_model::{OwnerId, Patch, Subtask, SubtaskId, Task, TaskId, Timestamp};
use smarttask_store::{StoreError, TaskStore};

#[derive(Debug)]
#[non_exhaustive]
pub enum ServiceError {
    /// The parent task of a to-be-created subtask does not exist or is not
    /// owned by the caller.
    ParentTaskNotFound,
    /// Storage fault. Not retried; the handler logs it and answers 500.
    Storage(StoreError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentTaskNotFound => write!(f, "parent task not found or not owned"),
            Self::Storage(err) => write!(f, "storage fault: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err)
    }
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    #[must_use]
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn list_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>, ServiceError> {
        Ok(self.store.list_tasks(owner).await?)
    }

    pub async fn get_task(
        &self,
        task_id: &TaskId,
        owner: &OwnerId,
    ) -> Result<Option<Task>, ServiceError> {
        Ok(self.store.get_task(task_id, owner).await?)
    }

    /// Title arrives already trimmed and non-blank from the controller. The
    /// owner is stamped here, never taken from the request body.
    pub async fn create_task(&self, title: String, owner: OwnerId) -> Result<Task, ServiceError> {
        let task = Task::new(title, owner, Timestamp::now());
        self.store.insert_task(&task).await?;
        Ok(task)
    }

    pub async fn update_task(
        &self,
        task_id: &TaskId,
        owner: &OwnerId,
        patch: &Patch,
    ) -> Result<Option<Task>, ServiceError> {
        Ok(self
            .store
            .update_task(task_id, owner, patch, Timestamp::now())
            .await?)
    }

    pub async fn delete_task(
        &self,
        task_id: &TaskId,
        owner: &OwnerId,
    ) -> Result<bool, ServiceError> {
        Ok(self.store.delete_task(task_id, owner).await?)
    }

    pub async fn create_subtask(
        &self,
        title: String,
        task_id: TaskId,
        owner: &OwnerId,
    ) -> Result<Subtask, ServiceError> {
        let subtask = Subtask::new(title, task_id, Timestamp::now());
        if self.store.insert_subtask(&subtask, owner).await? {
            Ok(subtask)
        } else {
            Err(ServiceError::ParentTaskNotFound)
        }
    }

    pub async fn update_subtask(
        &self,
        subtask_id: &SubtaskId,
        owner: &OwnerId,
        patch: &Patch,
    ) -> Result<Option<Subtask>, ServiceError> {
        Ok(self
            .store
            .update_subtask(subtask_id, owner, patch, Timestamp::now())
            .await?)
    }

    pub async fn delete_subtask(
        &self,
        subtask_id: &SubtaskId,
        owner: &OwnerId,
    ) -> Result<bool, ServiceError> {
        Ok(self.store.delete_subtask(subtask_id, owner).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarttask_store::MemoryTaskStore;

    fn service() -> (Arc<MemoryTaskStore>, TaskService) {
        let store = Arc::new(MemoryTaskStore::new());
        (store.clone(), TaskService::new(store))
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).expect("owner id")
    }

    #[tokio::test]
    async fn created_task_is_stamped_with_caller_identity() {
        let (_, svc) = service();
        let alice = owner("alice");
        let task = svc
            .create_task("Ship spec".to_string(), alice.clone())
            .await
            .expect("create");
        assert_eq!(task.user_id, alice);
        assert!(!task.completed);
        assert!(task.subtasks.is_empty());

        let found = svc.get_task(&task.id, &alice).await.expect("get");
        assert_eq!(found.as_ref().map(|t| t.title.as_str()), Some("Ship spec"));
    }

    #[tokio::test]
    async fn get_task_is_absent_for_any_other_owner() {
        let (_, svc) = service();
        let task = svc
            .create_task("secret".to_string(), owner("alice"))
            .await
            .expect("create");
        let other = svc.get_task(&task.id, &owner("bob")).await.expect("get");
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn delete_then_get_is_absent_and_second_delete_is_false() {
        let (_, svc) = service();
        let alice = owner("alice");
        let task = svc
            .create_task("temp".to_string(), alice.clone())
            .await
            .expect("create");

        assert!(svc.delete_task(&task.id, &alice).await.expect("delete"));
        assert!(svc.get_task(&task.id, &alice).await.expect("get").is_none());
        assert!(!svc.delete_task(&task.id, &alice).await.expect("delete"));
    }

    #[tokio::test]
    async fn subtask_creation_under_foreign_parent_is_a_distinct_failure() {
        let (_, svc) = service();
        let task = svc
            .create_task("parent".to_string(), owner("alice"))
            .await
            .expect("create");

        let err = svc
            .create_subtask("child".to_string(), task.id.clone(), &owner("bob"))
            .await
            .expect_err("foreign parent");
        assert!(matches!(err, ServiceError::ParentTaskNotFound));

        // Against an accessible parent the same call succeeds.
        let sub = svc
            .create_subtask("child".to_string(), task.id.clone(), &owner("alice"))
            .await
            .expect("create subtask");
        assert_eq!(sub.task_id, task.id);
    }

    #[tokio::test]
    async fn cross_tenant_subtask_update_is_absent_and_does_not_mutate() {
        let (_, svc) = service();
        let alice = owner("alice");
        let task = svc
            .create_task("parent".to_string(), alice.clone())
            .await
            .expect("create");
        let sub = svc
            .create_subtask("child".to_string(), task.id.clone(), &alice)
            .await
            .expect("subtask");

        let patch = Patch {
            completed: Some(true),
            ..Patch::default()
        };
        let result = svc
            .update_subtask(&sub.id, &owner("mallory"), &patch)
            .await
            .expect("update");
        assert!(result.is_none());

        let parent = svc
            .get_task(&task.id, &alice)
            .await
            .expect("get")
            .expect("parent");
        assert!(!parent.subtasks[0].completed, "no mutation happened");
    }

    #[tokio::test]
    async fn storage_faults_surface_as_storage_errors() {
        let (store, svc) = service();
        store.set_fail(true);
        let err = svc.list_tasks(&owner("alice")).await.expect_err("fault");
        assert!(matches!(err, ServiceError::Storage(_)));
    }
}
