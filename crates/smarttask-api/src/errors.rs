// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Classification of a client-visible failure. The wire body is always
/// `{"error": <message>}`; the code exists so status mapping and logging
/// stay in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    MissingField,
    InvalidBody,
    Unauthorized,
    TaskNotFound,
    SubtaskNotFound,
    RouteNotFound,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidBody => "invalid_body",
            Self::Unauthorized => "unauthorized",
            Self::TaskNotFound => "task_not_found",
            Self::SubtaskNotFound => "subtask_not_found",
            Self::RouteNotFound => "route_not_found",
            Self::Internal => "internal",
        }
    }
}

/// HTTP status for an error code. Pure so it can be asserted in isolation.
#[must_use]
pub const fn map_error_status(code: ApiErrorCode) -> u16 {
    match code {
        ApiErrorCode::MissingField | ApiErrorCode::InvalidBody => 400,
        ApiErrorCode::Unauthorized => 401,
        ApiErrorCode::TaskNotFound
        | ApiErrorCode::SubtaskNotFound
        | ApiErrorCode::RouteNotFound => 404,
        ApiErrorCode::Internal => 500,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Missing or blank required field, e.g. `Title is required`.
    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::new(ApiErrorCode::MissingField, format!("{field} is required"))
    }

    #[must_use]
    pub fn invalid_body() -> Self {
        Self::new(ApiErrorCode::InvalidBody, "Invalid request body")
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(ApiErrorCode::Unauthorized, "Unauthorized")
    }

    /// Covers both nonexistence and foreign ownership; the two are
    /// indistinguishable on the wire so non-owners learn nothing.
    #[must_use]
    pub fn task_not_found() -> Self {
        Self::new(ApiErrorCode::TaskNotFound, "Task not found")
    }

    #[must_use]
    pub fn subtask_not_found() -> Self {
        Self::new(ApiErrorCode::SubtaskNotFound, "Subtask not found")
    }

    #[must_use]
    pub fn route_not_found() -> Self {
        Self::new(ApiErrorCode::RouteNotFound, "Route not found")
    }

    /// Opaque message; the underlying fault is logged server-side only.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(ApiErrorCode::Internal, "Internal server error")
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        map_error_status(self.code)
    }

    #[must_use]
    pub fn body(&self) -> Value {
        json!({ "error": self.message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_contract() {
        assert_eq!(ApiError::missing_field("Title").status(), 400);
        assert_eq!(ApiError::invalid_body().status(), 400);
        assert_eq!(ApiError::unauthorized().status(), 401);
        assert_eq!(ApiError::task_not_found().status(), 404);
        assert_eq!(ApiError::subtask_not_found().status(), 404);
        assert_eq!(ApiError::route_not_found().status(), 404);
        assert_eq!(ApiError::internal().status(), 500);
    }

    #[test]
    fn body_is_the_error_envelope() {
        let err = ApiError::missing_field("Task ID");
        assert_eq!(err.body(), json!({"error": "Task ID is required"}));
    }

    #[test]
    fn internal_message_is_opaque() {
        assert_eq!(ApiError::internal().message, "Internal server error");
    }
}
