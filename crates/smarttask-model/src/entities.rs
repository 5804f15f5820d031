// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::ids::{OwnerId, SubtaskId, TaskId};
use crate::timestamp::Timestamp;

/// A task owned by a single user. `user_id` is stamped at creation from the
/// resolved identity and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    pub user_id: OwnerId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

/// A subtask of one task. Ownership is transitive: a subtask belongs to
/// whoever owns its parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: SubtaskId,
    pub title: String,
    pub completed: bool,
    pub task_id: TaskId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    #[must_use]
    pub fn new(title: String, user_id: OwnerId, now: Timestamp) -> Self {
        Self {
            id: TaskId::generate(),
            title,
            completed: false,
            user_id,
            created_at: now,
            updated_at: now,
            subtasks: Vec::new(),
        }
    }
}

impl Subtask {
    #[must_use]
    pub fn new(title: String, task_id: TaskId, now: Timestamp) -> Self {
        Self {
            id: SubtaskId::generate(),
            title,
            completed: false,
            task_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a task or subtask. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Patch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// Trims a raw title and rejects blank input. Returns the stored form.
#[must_use]
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::new("user-1").expect("owner id")
    }

    #[test]
    fn new_task_starts_incomplete_with_no_subtasks() {
        let task = Task::new("Buy milk".to_string(), owner(), Timestamp::now());
        assert!(!task.completed);
        assert!(task.subtasks.is_empty());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn task_serializes_with_camel_case_fields() {
        let task = Task::new("Ship spec".to_string(), owner(), Timestamp::now());
        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(value["userId"], "user-1");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["subtasks"], serde_json::json!([]));
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn subtask_serializes_task_id_in_camel_case() {
        let task = Task::new("t".to_string(), owner(), Timestamp::now());
        let sub = Subtask::new("s".to_string(), task.id.clone(), Timestamp::now());
        let value = serde_json::to_value(&sub).expect("serialize");
        assert_eq!(value["taskId"], task.id.as_str());
        assert!(value.get("subtasks").is_none());
    }

    #[test]
    fn normalize_title_trims_and_rejects_blank() {
        assert_eq!(normalize_title("  Buy milk  ").as_deref(), Some("Buy milk"));
        assert_eq!(normalize_title(""), None);
        assert_eq!(normalize_title("   "), None);
    }

    #[test]
    fn patch_reports_emptiness() {
        assert!(Patch::default().is_empty());
        let patch = Patch {
            completed: Some(true),
            ..Patch::default()
        };
        assert!(!patch.is_empty());
    }
}
