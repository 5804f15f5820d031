// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers: shape validation and status mapping only. Ownership
//! decisions live in the service; the owner id comes exclusively from the
//! `Identity` extension the identity middleware installed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::{json, Value};
use smarttask_api::{ApiError, UpdateBody};
use smarttask_model::{normalize_title, Patch, SubtaskId, TaskId, Timestamp};
use tracing::info;

use crate::http::response::{error_response, internal_error};
use crate::middleware::identity::Identity;
use crate::service::ServiceError;
use crate::AppState;

/// Path parameters are rejected when blank; a syntactically impossible id
/// can never match a row, so it maps straight to the absent case.
fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::missing_field("Task ID"));
    }
    TaskId::new(trimmed).map_err(|_| ApiError::task_not_found())
}

fn parse_subtask_id(raw: &str) -> Result<SubtaskId, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::missing_field("Subtask ID"));
    }
    SubtaskId::new(trimmed).map_err(|_| ApiError::subtask_not_found())
}

fn required_title(body: Option<&Value>) -> Result<String, ApiError> {
    body.and_then(|v| v.get("title"))
        .and_then(Value::as_str)
        .and_then(normalize_title)
        .ok_or_else(|| ApiError::missing_field("Title"))
}

/// Absent body means an empty patch; wrong-typed fields are a 400; a present
/// but blank title is a 400, same as on create.
fn parse_patch(body: Option<Json<Value>>) -> Result<Patch, ApiError> {
    let Some(Json(value)) = body else {
        return Ok(Patch::default());
    };
    let update: UpdateBody =
        serde_json::from_value(value).map_err(|_| ApiError::invalid_body())?;
    update.into_patch().ok_or_else(|| ApiError::missing_field("Title"))
}

pub(crate) async fn list_tasks_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    match state.service.list_tasks(&identity.owner).await {
        Ok(tasks) => Json(tasks).into_response(),
        Err(err) => internal_error("list tasks", &err),
    }
}

pub(crate) async fn get_task_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<String>,
) -> Response {
    let task_id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    match state.service.get_task(&task_id, &identity.owner).await {
        Ok(Some(task)) => Json(task).into_response(),
        Ok(None) => error_response(&ApiError::task_not_found()),
        Err(err) => internal_error("get task", &err),
    }
}

pub(crate) async fn create_task_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Option<Json<Value>>,
) -> Response {
    let title = match required_title(body.as_ref().map(|Json(v)| v)) {
        Ok(title) => title,
        Err(err) => return error_response(&err),
    };
    match state.service.create_task(title, identity.owner).await {
        Ok(task) => {
            info!(task_id = %task.id, "task created");
            (StatusCode::CREATED, Json(task)).into_response()
        }
        Err(err) => internal_error("create task", &err),
    }
}

pub(crate) async fn update_task_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<String>,
    body: Option<Json<Value>>,
) -> Response {
    let task_id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let patch = match parse_patch(body) {
        Ok(patch) => patch,
        Err(err) => return error_response(&err),
    };
    match state
        .service
        .update_task(&task_id, &identity.owner, &patch)
        .await
    {
        Ok(Some(task)) => Json(task).into_response(),
        Ok(None) => error_response(&ApiError::task_not_found()),
        Err(err) => internal_error("update task", &err),
    }
}

pub(crate) async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<String>,
) -> Response {
    let task_id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    match state.service.delete_task(&task_id, &identity.owner).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(&ApiError::task_not_found()),
        Err(err) => internal_error("delete task", &err),
    }
}

pub(crate) async fn create_subtask_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(task_id): Path<String>,
    body: Option<Json<Value>>,
) -> Response {
    let task_id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let title = match required_title(body.as_ref().map(|Json(v)| v)) {
        Ok(title) => title,
        Err(err) => return error_response(&err),
    };
    match state
        .service
        .create_subtask(title, task_id, &identity.owner)
        .await
    {
        Ok(subtask) => {
            info!(subtask_id = %subtask.id, task_id = %subtask.task_id, "subtask created");
            (StatusCode::CREATED, Json(subtask)).into_response()
        }
        Err(ServiceError::ParentTaskNotFound) => error_response(&ApiError::task_not_found()),
        Err(err) => internal_error("create subtask", &err),
    }
}

pub(crate) async fn update_subtask_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(subtask_id): Path<String>,
    body: Option<Json<Value>>,
) -> Response {
    let subtask_id = match parse_subtask_id(&subtask_id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let patch = match parse_patch(body) {
        Ok(patch) => patch,
        Err(err) => return error_response(&err),
    };
    match state
        .service
        .update_subtask(&subtask_id, &identity.owner, &patch)
        .await
    {
        Ok(Some(subtask)) => Json(subtask).into_response(),
        Ok(None) => error_response(&ApiError::subtask_not_found()),
        Err(err) => internal_error("update subtask", &err),
    }
}

pub(crate) async fn delete_subtask_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(subtask_id): Path<String>,
) -> Response {
    let subtask_id = match parse_subtask_id(&subtask_id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    match state
        .service
        .delete_subtask(&subtask_id, &identity.owner)
        .await
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(&ApiError::subtask_not_found()),
        Err(err) => internal_error("delete subtask", &err),
    }
}

pub(crate) async fn health_handler() -> Response {
    Json(json!({ "status": "ok", "timestamp": Timestamp::now() })).into_response()
}

pub(crate) async fn fallback_handler() -> Response {
    error_response(&ApiError::route_not_found())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_path_params_are_required_errors() {
        let err = parse_task_id("   ").expect_err("blank");
        assert_eq!(err.message, "Task ID is required");
        let err = parse_subtask_id("").expect_err("empty");
        assert_eq!(err.message, "Subtask ID is required");
    }

    #[test]
    fn malformed_ids_collapse_into_not_found() {
        let err = parse_task_id("has spaces inside").expect_err("invalid");
        assert_eq!(err.message, "Task not found");
    }

    #[test]
    fn title_must_be_a_non_blank_string() {
        assert!(required_title(None).is_err());
        assert!(required_title(Some(&json!({}))).is_err());
        assert!(required_title(Some(&json!({"title": "   "}))).is_err());
        assert!(required_title(Some(&json!({"title": 7}))).is_err());
        let title = required_title(Some(&json!({"title": "  Buy milk  "}))).expect("valid");
        assert_eq!(title, "Buy milk");
    }

    #[test]
    fn patch_parsing_distinguishes_missing_body_from_bad_body() {
        assert!(parse_patch(None).expect("empty").is_empty());
        let err = parse_patch(Some(Json(json!({"completed": "yes"})))).expect_err("bad type");
        assert_eq!(err.message, "Invalid request body");
        let patch = parse_patch(Some(Json(json!({"completed": true})))).expect("valid");
        assert_eq!(patch.completed, Some(true));
    }
}
