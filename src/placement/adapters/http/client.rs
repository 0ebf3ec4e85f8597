//! `reqwest`-backed sync client.

use super::models::{SprintPayload, SprintUpdateBody, StatusUpdateBody, TaskPayload};
use crate::config::SyncSettings;
use crate::placement::{
    domain::{BoardScope, Sprint, SprintId, Task, TaskId, TaskStatus},
    ports::{SyncClient, SyncClientError, SyncClientResult},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

const TEMPLATE_QUERY_KEY: &str = "templateType";

/// Sync client talking JSON over HTTP to the project backend.
#[derive(Debug, Clone)]
pub struct HttpSyncClient {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpSyncClient {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SyncClientError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> SyncClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SyncClientError::transport)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            bearer_token: None,
        })
    }

    /// Creates a client from configuration, reading the bearer token from
    /// the configured environment variable when present.
    ///
    /// # Errors
    ///
    /// Returns [`SyncClientError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn from_settings(settings: &SyncSettings) -> SyncClientResult<Self> {
        let mut client = Self::new(settings.base_url.clone(), settings.timeout())?;
        client.bearer_token = settings.bearer_token();
        Ok(client)
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn task_url(&self, scope: &BoardScope, task_id: TaskId, field: &str) -> String {
        format!(
            "{}/projects/{}/tasks/{task_id}/{field}",
            self.base_url,
            scope.project_id()
        )
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> SyncClientResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(map_reqwest_error)
    }
}

/// Maps a `reqwest` failure onto the port error.
fn map_reqwest_error(err: reqwest::Error) -> SyncClientError {
    if err.is_timeout() {
        SyncClientError::Timeout
    } else {
        SyncClientError::transport(err)
    }
}

/// Maps a non-success status onto the port error.
///
/// A 404 names the task when the request targeted one.
#[must_use]
pub(crate) fn error_for_status(
    status: u16,
    message: String,
    task_id: Option<TaskId>,
) -> SyncClientError {
    match (status, task_id) {
        (404, Some(id)) => SyncClientError::NotFound(id),
        (500..=599, _) => SyncClientError::Server { status, message },
        _ => SyncClientError::Rejected { status, message },
    }
}

async fn ensure_success(response: Response, task_id: Option<TaskId>) -> SyncClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or_default().to_owned()
    } else {
        error_message(&body)
    };
    Err(error_for_status(status.as_u16(), message, task_id))
}

/// Extracts `message` or `error` from a JSON error body, falling back to the
/// raw text.
pub(crate) fn error_message(body: &str) -> String {
    let field = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(*key)?.as_str().map(str::to_owned))
        });
    field.unwrap_or_else(|| body.trim().to_owned())
}

async fn decode_task(response: Response, task_id: TaskId) -> SyncClientResult<Task> {
    let payload: TaskPayload = ensure_success(response, Some(task_id))
        .await?
        .json()
        .await
        .map_err(map_reqwest_error)?;
    Task::try_from(payload).map_err(SyncClientError::transport)
}

#[async_trait]
impl SyncClient for HttpSyncClient {
    async fn update_status(
        &self,
        scope: &BoardScope,
        task_id: TaskId,
        status: TaskStatus,
    ) -> SyncClientResult<Task> {
        let url = self.task_url(scope, task_id, "status");
        debug!(%url, %status, "sending status update");
        let body = StatusUpdateBody {
            status: status.label(),
            template_type: scope.template_type().as_str(),
        };
        let response = self.send(self.client.patch(&url).json(&body)).await?;
        decode_task(response, task_id).await
    }

    async fn update_sprint_assignment(
        &self,
        scope: &BoardScope,
        task_id: TaskId,
        sprint_id: Option<SprintId>,
    ) -> SyncClientResult<Task> {
        let url = self.task_url(scope, task_id, "sprint");
        debug!(%url, sprint_id = ?sprint_id.map(SprintId::value), "sending sprint assignment");
        let body = SprintUpdateBody {
            sprint_id: sprint_id.map(SprintId::value),
            template_type: scope.template_type().as_str(),
        };
        let response = self.send(self.client.patch(&url).json(&body)).await?;
        decode_task(response, task_id).await
    }

    async fn list_tasks(&self, scope: &BoardScope) -> SyncClientResult<Vec<Task>> {
        let url = format!("{}/projects/{}/tasks", self.base_url, scope.project_id());
        let request = self
            .client
            .get(&url)
            .query(&[(TEMPLATE_QUERY_KEY, scope.template_type().as_str())]);
        let payloads: Vec<TaskPayload> = ensure_success(self.send(request).await?, None)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        payloads
            .into_iter()
            .map(|payload| Task::try_from(payload).map_err(SyncClientError::transport))
            .collect()
    }

    async fn latest_sprint(&self, scope: &BoardScope) -> SyncClientResult<Option<Sprint>> {
        let url = format!(
            "{}/projects/{}/sprints/latest",
            self.base_url,
            scope.project_id()
        );
        let request = self
            .client
            .get(&url)
            .query(&[(TEMPLATE_QUERY_KEY, scope.template_type().as_str())]);
        let response = self.send(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let payload: Option<SprintPayload> = ensure_success(response, None)
            .await?
            .json()
            .await
            .map_err(map_reqwest_error)?;
        Ok(payload.and_then(SprintPayload::into_sprint))
    }
}
