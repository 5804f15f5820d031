// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin typed client over the smarttask HTTP API.
//!
//! Every method mirrors one route: the request body types come from
//! `smarttask-api`, the response types from `smarttask-model`, and any
//! non-2xx response is surfaced as [`ClientError::Status`] carrying the
//! server's error message verbatim.

#![forbid(unsafe_code)]

use std::fmt;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use smarttask_api::{CreateSubtaskBody, CreateTaskBody, ErrorBody, UpdateBody};
use smarttask_model::{Subtask, Task};

/// Failure surface of the client: either the server answered with an
/// error status, or the request never completed.
#[derive(Debug)]
#[non_exhaustive]
pub enum ClientError {
    /// The server responded with a non-success status. `message` is the
    /// `error` field of the response body when the server sent one.
    Status { status: u16, message: String },
    /// Connection, timeout, or decoding failure below the HTTP layer.
    Transport(reqwest::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, message } => {
                write!(f, "{message} (status: {status})")
            }
            Self::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Status { .. } => None,
            Self::Transport(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Gateway to one smarttask server, bound to one caller identity.
#[derive(Debug, Clone)]
pub struct TaskApiClient {
    base_url: String,
    identity_header: String,
    identity: Option<String>,
    http: reqwest::Client,
}

impl TaskApiClient {
    /// Builds a client for `base_url` (scheme and host, no trailing slash
    /// required). Fails only if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            identity_header: "x-user-id".to_string(),
            identity: None,
            http,
        })
    }

    /// Sets the caller identity sent with every request.
    #[must_use]
    pub fn with_identity(mut self, user: impl Into<String>) -> Self {
        self.identity = Some(user.into());
        self
    }

    /// Overrides the header name the identity is sent under.
    #[must_use]
    pub fn with_identity_header(mut self, name: impl Into<String>) -> Self {
        self.identity_header = name.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(user) = &self.identity {
            req = req.header(&self.identity_header, user);
        }
        req
    }

    async fn expect_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.json::<T>().await?)
        } else {
            Err(status_error(status, resp.text().await.ok()))
        }
    }

    async fn expect_no_content(req: RequestBuilder) -> Result<()> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status, resp.text().await.ok()))
        }
    }

    /// `GET /api/tasks`: every task the caller owns, newest first.
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        Self::expect_json(self.request(Method::GET, "/api/tasks")).await
    }

    /// `GET /api/tasks/:id`: one owned task with its subtasks.
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        Self::expect_json(self.request(Method::GET, &format!("/api/tasks/{task_id}"))).await
    }

    /// `POST /api/tasks`: creates a task and returns it.
    pub async fn create_task(&self, title: &str) -> Result<Task> {
        let body = CreateTaskBody {
            title: title.to_string(),
        };
        Self::expect_json(self.request(Method::POST, "/api/tasks").json(&body)).await
    }

    /// `PUT /api/tasks/:id`: partial update, returns the updated task.
    pub async fn update_task(&self, task_id: &str, update: &UpdateBody) -> Result<Task> {
        Self::expect_json(
            self.request(Method::PUT, &format!("/api/tasks/{task_id}"))
                .json(update),
        )
        .await
    }

    /// `DELETE /api/tasks/:id`: removes a task and its subtasks.
    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        Self::expect_no_content(self.request(Method::DELETE, &format!("/api/tasks/{task_id}")))
            .await
    }

    /// `POST /api/tasks/:id/subtasks`: creates a subtask under an owned task.
    pub async fn create_subtask(&self, task_id: &str, title: &str) -> Result<Subtask> {
        let body = CreateSubtaskBody {
            title: title.to_string(),
        };
        Self::expect_json(
            self.request(Method::POST, &format!("/api/tasks/{task_id}/subtasks"))
                .json(&body),
        )
        .await
    }

    /// `PUT /api/tasks/subtasks/:id`: partial update of a subtask.
    pub async fn update_subtask(&self, subtask_id: &str, update: &UpdateBody) -> Result<Subtask> {
        Self::expect_json(
            self.request(Method::PUT, &format!("/api/tasks/subtasks/{subtask_id}"))
                .json(update),
        )
        .await
    }

    /// `DELETE /api/tasks/subtasks/:id`: removes a subtask.
    pub async fn delete_subtask(&self, subtask_id: &str) -> Result<()> {
        Self::expect_no_content(
            self.request(Method::DELETE, &format!("/api/tasks/subtasks/{subtask_id}")),
        )
        .await
    }
}

fn status_error(status: StatusCode, body: Option<String>) -> ClientError {
    let message = body
        .as_deref()
        .and_then(|text| serde_json::from_str::<ErrorBody>(text).ok())
        .map(|e| e.error)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
    ClientError::Status {
        status: status.as_u16(),
        message,
    }
}
