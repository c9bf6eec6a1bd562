//! HTTP client for the remote task API.
//!
//! The API is the system of record: `GET/POST /api/tasks` and
//! `PUT/DELETE /api/tasks/{id}`, JSON bodies shaped like [`Task`].

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::models::{Task, TaskId};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
}

/// Operations the synchronizer needs from the remote store.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, ApiError>;
    /// The response body is ignored; callers re-fetch to learn the assigned id.
    async fn create(&self, task: &Task) -> Result<(), ApiError>;
    async fn update(&self, id: &TaskId, task: &Task) -> Result<(), ApiError>;
    async fn delete(&self, id: &TaskId) -> Result<(), ApiError>;
}

pub struct HttpTaskApi {
    client: reqwest::Client,
    tasks_url: String,
}

impl HttpTaskApi {
    /// `base_url` is the API origin, e.g. `http://localhost:8085`
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            tasks_url: format!("{}/api/tasks", base_url.trim_end_matches('/')),
        }
    }

    pub fn tasks_url(&self) -> &str {
        &self.tasks_url
    }

    fn task_url(&self, id: &TaskId) -> String {
        format!("{}/{}", self.tasks_url, id)
    }

    async fn check(
        method: Method,
        url: String,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            method,
            url,
            status,
            body,
        })
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        debug!(url = %self.tasks_url, "GET tasks");
        let response = self.client.get(&self.tasks_url).send().await?;
        let response = Self::check(Method::GET, self.tasks_url.clone(), response).await?;
        Ok(response.json::<Vec<Task>>().await?)
    }

    async fn create(&self, task: &Task) -> Result<(), ApiError> {
        debug!(url = %self.tasks_url, title = %task.title, "POST task");
        let body = Task {
            id: None,
            ..task.clone()
        };
        let response = self.client.post(&self.tasks_url).json(&body).send().await?;
        Self::check(Method::POST, self.tasks_url.clone(), response).await?;
        Ok(())
    }

    async fn update(&self, id: &TaskId, task: &Task) -> Result<(), ApiError> {
        let url = self.task_url(id);
        debug!(%url, "PUT task");
        let response = self.client.put(&url).json(task).send().await?;
        Self::check(Method::PUT, url, response).await?;
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        let url = self.task_url(id);
        debug!(%url, "DELETE task");
        let response = self.client.delete(&url).send().await?;
        Self::check(Method::DELETE, url, response).await?;
        Ok(())
    }
}
