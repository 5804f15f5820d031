// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use smarttask_model::Patch;

/// `POST /api/tasks` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskBody {
    pub title: String,
}

/// `POST /api/tasks/:taskId/subtasks` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubtaskBody {
    pub title: String,
}

/// `PUT` request body for tasks and subtasks alike. Unknown fields are
/// ignored; wrong-typed known fields fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl UpdateBody {
    /// Converts into a storage patch, trimming the title. A present but
    /// blank title yields `None`: the handler turns that into a 400.
    #[must_use]
    pub fn into_patch(self) -> Option<Patch> {
        let title = match self.title {
            Some(raw) => Some(smarttask_model::normalize_title(&raw)?),
            None => None,
        };
        Some(Patch {
            title,
            completed: self.completed,
        })
    }
}

/// The uniform error envelope every failure response carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_trims_title_into_patch() {
        let body = UpdateBody {
            title: Some("  Ship it  ".to_string()),
            completed: Some(true),
        };
        let patch = body.into_patch().expect("valid patch");
        assert_eq!(patch.title.as_deref(), Some("Ship it"));
        assert_eq!(patch.completed, Some(true));
    }

    #[test]
    fn blank_title_in_update_is_rejected() {
        let body = UpdateBody {
            title: Some("   ".to_string()),
            completed: None,
        };
        assert!(body.into_patch().is_none());
    }

    #[test]
    fn empty_update_body_is_an_empty_patch() {
        let patch = UpdateBody::default().into_patch().expect("empty patch");
        assert!(patch.is_empty());
    }

    #[test]
    fn update_body_tolerates_unknown_fields() {
        let body: UpdateBody =
            serde_json::from_str(r#"{"completed": false, "color": "red"}"#).expect("parse");
        assert_eq!(body.completed, Some(false));
        assert_eq!(body.title, None);
    }

    #[test]
    fn update_body_rejects_wrong_types() {
        assert!(serde_json::from_str::<UpdateBody>(r#"{"completed": "yes"}"#).is_err());
    }
}
