// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use smarttask_model::{OwnerId, Patch, Subtask, Task, TaskId, Timestamp};
use smarttask_store::{MemoryTaskStore, SqliteTaskStore, TaskStore};
use tempfile::tempdir;

fn owner(name: &str) -> OwnerId {
    OwnerId::new(name).expect("owner id")
}

fn task_at(title: &str, owner: &OwnerId, millis: i64) -> Task {
    let ts = Timestamp::from_unix_millis(millis).expect("timestamp");
    let mut task = Task::new(title.to_string(), owner.clone(), ts);
    task.created_at = ts;
    task.updated_at = ts;
    task
}

fn subtask_at(title: &str, parent: &TaskId, millis: i64) -> Subtask {
    let ts = Timestamp::from_unix_millis(millis).expect("timestamp");
    Subtask::new(title.to_string(), parent.clone(), ts)
}

fn backends() -> Vec<(&'static str, Arc<dyn TaskStore>)> {
    vec![
        (
            "sqlite",
            Arc::new(SqliteTaskStore::open_in_memory().expect("open sqlite")) as Arc<dyn TaskStore>,
        ),
        ("memory", Arc::new(MemoryTaskStore::new()) as Arc<dyn TaskStore>),
    ]
}

#[tokio::test]
async fn created_task_is_visible_to_its_owner_only() {
    for (name, store) in backends() {
        let alice = owner("alice");
        let bob = owner("bob");
        let task = task_at("Buy milk", &alice, 1_000);
        store.insert_task(&task).await.expect("insert");

        let found = store
            .get_task(&task.id, &alice)
            .await
            .expect("get")
            .unwrap_or_else(|| panic!("{name}: owner must see their task"));
        assert_eq!(found.title, "Buy milk");
        assert!(!found.completed);

        assert!(
            store.get_task(&task.id, &bob).await.expect("get").is_none(),
            "{name}: foreign owner must get absent, not an error"
        );
    }
}

#[tokio::test]
async fn list_returns_newest_first_with_subtasks_attached() {
    for (name, store) in backends() {
        let alice = owner("alice");
        let first = task_at("first", &alice, 1_000);
        let second = task_at("second", &alice, 2_000);
        store.insert_task(&first).await.expect("insert");
        store.insert_task(&second).await.expect("insert");

        let sub_a = subtask_at("a", &first.id, 1_100);
        let sub_b = subtask_at("b", &first.id, 1_200);
        assert!(store.insert_subtask(&sub_a, &alice).await.expect("sub"));
        assert!(store.insert_subtask(&sub_b, &alice).await.expect("sub"));

        let tasks = store.list_tasks(&alice).await.expect("list");
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"], "{name}: newest first");
        let sub_titles: Vec<_> = tasks[1].subtasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(sub_titles, ["a", "b"], "{name}: subtasks oldest first");
        assert!(tasks[0].subtasks.is_empty());
    }
}

#[tokio::test]
async fn update_applies_partial_patch_and_refreshes_updated_at() {
    for (name, store) in backends() {
        let alice = owner("alice");
        let task = task_at("draft", &alice, 1_000);
        store.insert_task(&task).await.expect("insert");

        let later = Timestamp::from_unix_millis(5_000).expect("timestamp");
        let patch = Patch {
            completed: Some(true),
            ..Patch::default()
        };
        let updated = store
            .update_task(&task.id, &alice, &patch, later)
            .await
            .expect("update")
            .unwrap_or_else(|| panic!("{name}: owned update must succeed"));
        assert_eq!(updated.title, "draft", "{name}: title untouched");
        assert!(updated.completed);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, task.created_at);
    }
}

#[tokio::test]
async fn foreign_update_is_absent_and_writes_nothing() {
    for (name, store) in backends() {
        let alice = owner("alice");
        let mallory = owner("mallory");
        let task = task_at("private", &alice, 1_000);
        store.insert_task(&task).await.expect("insert");

        let later = Timestamp::from_unix_millis(9_000).expect("timestamp");
        let patch = Patch {
            title: Some("stolen".to_string()),
            completed: Some(true),
        };
        let result = store
            .update_task(&task.id, &mallory, &patch, later)
            .await
            .expect("update");
        assert!(result.is_none(), "{name}: cross-tenant update must be absent");

        let unchanged = store
            .get_task(&task.id, &alice)
            .await
            .expect("get")
            .expect("still there");
        assert_eq!(unchanged.title, "private", "{name}: no write happened");
        assert!(!unchanged.completed);
        assert_eq!(unchanged.updated_at, task.updated_at);
    }
}

#[tokio::test]
async fn delete_is_idempotent_and_owner_scoped() {
    for (name, store) in backends() {
        let alice = owner("alice");
        let bob = owner("bob");
        let task = task_at("ephemeral", &alice, 1_000);
        store.insert_task(&task).await.expect("insert");

        assert!(
            !store.delete_task(&task.id, &bob).await.expect("delete"),
            "{name}: foreign delete removes nothing"
        );
        assert!(store.delete_task(&task.id, &alice).await.expect("delete"));
        assert!(store.get_task(&task.id, &alice).await.expect("get").is_none());
        assert!(
            !store.delete_task(&task.id, &alice).await.expect("delete"),
            "{name}: second delete is false, not an error"
        );
    }
}

#[tokio::test]
async fn subtask_insert_requires_owned_parent() {
    for (name, store) in backends() {
        let alice = owner("alice");
        let bob = owner("bob");
        let task = task_at("parent", &alice, 1_000);
        store.insert_task(&task).await.expect("insert");

        let sub = subtask_at("child", &task.id, 1_100);
        assert!(
            !store.insert_subtask(&sub, &bob).await.expect("insert"),
            "{name}: foreign parent rejects subtask creation"
        );
        let parent = store
            .get_task(&task.id, &alice)
            .await
            .expect("get")
            .expect("parent");
        assert!(parent.subtasks.is_empty(), "{name}: no row was created");

        let missing_parent = subtask_at("orphan", &TaskId::generate(), 1_200);
        assert!(!store
            .insert_subtask(&missing_parent, &alice)
            .await
            .expect("insert"));
    }
}

#[tokio::test]
async fn subtask_mutations_are_transitively_owner_scoped() {
    for (name, store) in backends() {
        let alice = owner("alice");
        let mallory = owner("mallory");
        let task = task_at("parent", &alice, 1_000);
        store.insert_task(&task).await.expect("insert");
        let sub = subtask_at("child", &task.id, 1_100);
        assert!(store.insert_subtask(&sub, &alice).await.expect("insert"));

        let later = Timestamp::from_unix_millis(2_000).expect("timestamp");
        let patch = Patch {
            completed: Some(true),
            ..Patch::default()
        };
        assert!(
            store
                .update_subtask(&sub.id, &mallory, &patch, later)
                .await
                .expect("update")
                .is_none(),
            "{name}: foreign subtask update is absent"
        );
        assert!(!store.delete_subtask(&sub.id, &mallory).await.expect("delete"));

        let updated = store
            .update_subtask(&sub.id, &alice, &patch, later)
            .await
            .expect("update")
            .unwrap_or_else(|| panic!("{name}: owner update succeeds"));
        assert!(updated.completed);
        assert_eq!(updated.title, "child");

        assert!(store.delete_subtask(&sub.id, &alice).await.expect("delete"));
        assert!(!store.delete_subtask(&sub.id, &alice).await.expect("delete"));
    }
}

#[tokio::test]
async fn deleting_a_task_cascades_to_its_subtasks() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tasks.sqlite");
    let alice = owner("alice");
    let task = task_at("parent", &alice, 1_000);
    let sub = subtask_at("child", &task.id, 1_100);

    {
        let store = SqliteTaskStore::open(&path).expect("open");
        store.insert_task(&task).await.expect("insert");
        assert!(store.insert_subtask(&sub, &alice).await.expect("insert"));
        assert!(store.delete_task(&task.id, &alice).await.expect("delete"));
    }

    // Inspect the file directly: the cascade must leave no orphan rows.
    let conn = rusqlite::Connection::open(&path).expect("reopen");
    let subtask_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM subtasks", [], |r| r.get(0))
        .expect("count");
    assert_eq!(subtask_rows, 0);
}

#[tokio::test]
async fn sqlite_store_persists_across_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("tasks.sqlite");
    let alice = owner("alice");
    let task = task_at("durable", &alice, 1_000);

    {
        let store = SqliteTaskStore::open(&path).expect("open");
        store.insert_task(&task).await.expect("insert");
    }

    let store = SqliteTaskStore::open(&path).expect("reopen");
    let found = store
        .get_task(&task.id, &alice)
        .await
        .expect("get")
        .expect("persisted");
    assert_eq!(found.title, "durable");
    assert_eq!(found.created_at, task.created_at);
}
