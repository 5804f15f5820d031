// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use smarttask_model::{OwnerId, Patch, Subtask, SubtaskId, Task, TaskId, Timestamp};
use tokio::sync::Mutex;

use crate::{StoreError, StoreErrorCode, TaskStore};

/// The ownership rule, written once and referenced by every owner-scoped
/// statement. A task is visible iff its `user_id` matches; a subtask iff its
/// parent task's `user_id` matches.
const OWNED_TASK_FILTER: &str = "id = ?1 AND user_id = ?2";
const OWNED_SUBTASK_FILTER: &str =
    "id = ?1 AND task_id IN (SELECT id FROM tasks WHERE user_id = ?2)";

const TASK_COLUMNS: &str = "id, title, completed, user_id, created_at, updated_at";
const SUBTASK_COLUMNS: &str = "id, title, completed, task_id, created_at, updated_at";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id         TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    completed  INTEGER NOT NULL DEFAULT 0,
    user_id    TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
CREATE TABLE IF NOT EXISTS subtasks (
    id         TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    completed  INTEGER NOT NULL DEFAULT 0,
    task_id    TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_subtasks_task ON subtasks(task_id);
";

/// SQLite-backed store. One explicit handle, constructed at startup and
/// injected; connections never live in module-level state.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        // Cascade delete of subtasks relies on this pragma; it is per
        // connection, not part of the schema.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

type TaskRow = (String, String, bool, String, i64, i64);
type SubtaskRow = (String, String, bool, String, i64, i64);

fn task_from_row(row: TaskRow) -> Result<Task, StoreError> {
    let (id, title, completed, user_id, created_at, updated_at) = row;
    Ok(Task {
        id: TaskId::new(id).map_err(corrupt)?,
        title,
        completed,
        user_id: OwnerId::new(user_id).map_err(corrupt)?,
        created_at: Timestamp::from_unix_millis(created_at).map_err(corrupt)?,
        updated_at: Timestamp::from_unix_millis(updated_at).map_err(corrupt)?,
        subtasks: Vec::new(),
    })
}

fn subtask_from_row(row: SubtaskRow) -> Result<Subtask, StoreError> {
    let (id, title, completed, task_id, created_at, updated_at) = row;
    Ok(Subtask {
        id: SubtaskId::new(id).map_err(corrupt)?,
        title,
        completed,
        task_id: TaskId::new(task_id).map_err(corrupt)?,
        created_at: Timestamp::from_unix_millis(created_at).map_err(corrupt)?,
        updated_at: Timestamp::from_unix_millis(updated_at).map_err(corrupt)?,
    })
}

fn corrupt(err: smarttask_model::Error) -> StoreError {
    StoreError::new(StoreErrorCode::Corrupt, err.to_string())
}

fn read_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn read_subtask_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubtaskRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn subtasks_of(conn: &Connection, task_id: &TaskId) -> Result<Vec<Subtask>, StoreError> {
    let sql = format!(
        "SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE task_id = ?1 \
         ORDER BY created_at ASC, rowid ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![task_id.as_str()], read_subtask_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(subtask_from_row).collect()
}

fn owned_task(
    conn: &Connection,
    task_id: &TaskId,
    owner: &OwnerId,
) -> Result<Option<Task>, StoreError> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE {OWNED_TASK_FILTER}");
    let row = conn
        .query_row(&sql, params![task_id.as_str(), owner.as_str()], read_task_row)
        .optional()?;
    match row {
        Some(raw) => {
            let mut task = task_from_row(raw)?;
            task.subtasks = subtasks_of(conn, &task.id)?;
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

fn owned_subtask(
    conn: &Connection,
    subtask_id: &SubtaskId,
    owner: &OwnerId,
) -> Result<Option<Subtask>, StoreError> {
    let sql = format!("SELECT {SUBTASK_COLUMNS} FROM subtasks WHERE {OWNED_SUBTASK_FILTER}");
    let row = conn
        .query_row(
            &sql,
            params![subtask_id.as_str(), owner.as_str()],
            read_subtask_row,
        )
        .optional()?;
    row.map(subtask_from_row).transpose()
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list_tasks(&self, owner: &OwnerId) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 \
             ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let raw_tasks = stmt
            .query_map(params![owner.as_str()], read_task_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);

        // One pass over all of the owner's subtasks instead of a query per
        // task; bucket by parent id.
        let sql = format!(
            "SELECT {SUBTASK_COLUMNS} FROM subtasks \
             WHERE task_id IN (SELECT id FROM tasks WHERE user_id = ?1) \
             ORDER BY created_at ASC, rowid ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let raw_subtasks = stmt
            .query_map(params![owner.as_str()], read_subtask_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut by_task: HashMap<TaskId, Vec<Subtask>> = HashMap::new();
        for raw in raw_subtasks {
            let sub = subtask_from_row(raw)?;
            by_task.entry(sub.task_id.clone()).or_default().push(sub);
        }

        let mut tasks = Vec::with_capacity(raw_tasks.len());
        for raw in raw_tasks {
            let mut task = task_from_row(raw)?;
            task.subtasks = by_task.remove(&task.id).unwrap_or_default();
            tasks.push(task);
        }
        Ok(tasks)
    }

    async fn get_task(
        &self,
        task_id: &TaskId,
        owner: &OwnerId,
    ) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.lock().await;
        owned_task(&conn, task_id, owner)
    }

    async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO tasks (id, title, completed, user_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.id.as_str(),
                task.title,
                task.completed,
                task.user_id.as_str(),
                task.created_at.unix_millis(),
                task.updated_at.unix_millis(),
            ],
        )?;
        Ok(())
    }

    async fn update_task(
        &self,
        task_id: &TaskId,
        owner: &OwnerId,
        patch: &Patch,
        updated_at: Timestamp,
    ) -> Result<Option<Task>, StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let sql = format!("SELECT 1 FROM tasks WHERE {OWNED_TASK_FILTER}");
        let owned = tx
            .query_row(&sql, params![task_id.as_str(), owner.as_str()], |_| Ok(()))
            .optional()?;
        if owned.is_none() {
            return Ok(None);
        }
        tx.execute(
            "UPDATE tasks SET title = COALESCE(?2, title), \
             completed = COALESCE(?3, completed), updated_at = ?4 WHERE id = ?1",
            params![
                task_id.as_str(),
                patch.title,
                patch.completed,
                updated_at.unix_millis(),
            ],
        )?;
        let task = owned_task(&tx, task_id, owner)?;
        tx.commit()?;
        Ok(task)
    }

    async fn delete_task(&self, task_id: &TaskId, owner: &OwnerId) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let sql = format!("DELETE FROM tasks WHERE {OWNED_TASK_FILTER}");
        let removed = conn.execute(&sql, params![task_id.as_str(), owner.as_str()])?;
        Ok(removed > 0)
    }

    async fn insert_subtask(
        &self,
        subtask: &Subtask,
        owner: &OwnerId,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.lock().await;
        // Parent check and insert share one transaction so a concurrent
        // parent delete serializes entirely before or after this operation.
        let tx = conn.transaction()?;
        let sql = format!("SELECT 1 FROM tasks WHERE {OWNED_TASK_FILTER}");
        let parent = tx
            .query_row(
                &sql,
                params![subtask.task_id.as_str(), owner.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        if parent.is_none() {
            return Ok(false);
        }
        tx.execute(
            "INSERT INTO subtasks (id, title, completed, task_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                subtask.id.as_str(),
                subtask.title,
                subtask.completed,
                subtask.task_id.as_str(),
                subtask.created_at.unix_millis(),
                subtask.updated_at.unix_millis(),
            ],
        )?;
        tx.commit()?;
        Ok(true)
    }

    async fn update_subtask(
        &self,
        subtask_id: &SubtaskId,
        owner: &OwnerId,
        patch: &Patch,
        updated_at: Timestamp,
    ) -> Result<Option<Subtask>, StoreError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        if owned_subtask(&tx, subtask_id, owner)?.is_none() {
            return Ok(None);
        }
        tx.execute(
            "UPDATE subtasks SET title = COALESCE(?2, title), \
             completed = COALESCE(?3, completed), updated_at = ?4 WHERE id = ?1",
            params![
                subtask_id.as_str(),
                patch.title,
                patch.completed,
                updated_at.unix_millis(),
            ],
        )?;
        let subtask = owned_subtask(&tx, subtask_id, owner)?;
        tx.commit()?;
        Ok(subtask)
    }

    async fn delete_subtask(
        &self,
        subtask_id: &SubtaskId,
        owner: &OwnerId,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().await;
        let sql = format!("DELETE FROM subtasks WHERE {OWNED_SUBTASK_FILTER}");
        let removed = conn.execute(&sql, params![subtask_id.as_str(), owner.as_str()])?;
        Ok(removed > 0)
    }
}
