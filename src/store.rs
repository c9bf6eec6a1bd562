//! In-memory task list kept in step with the remote API.
//!
//! The store is the only writer of the list. Every successful mutation is
//! followed by a full re-fetch; nothing is merged locally. Readers either
//! take a snapshot with [`TaskStore::tasks`] or hold a live
//! [`watch::Receiver`] from [`TaskStore::subscribe`].

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::api::{ApiError, TaskApi};
use crate::models::{Task, TaskId};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),
}

#[derive(Clone)]
pub struct TaskStore {
    api: Arc<dyn TaskApi>,
    tasks: Arc<watch::Sender<Vec<Task>>>,
}

impl TaskStore {
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            api,
            tasks: Arc::new(tx),
        }
    }

    /// Snapshot of the current list
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.subscribe()
    }

    pub fn find(&self, id: &TaskId) -> Option<Task> {
        self.tasks
            .borrow()
            .iter()
            .find(|t| t.id.as_ref() == Some(id))
            .cloned()
    }

    /// Replace the list with whatever the server returns.
    /// On failure the current list is left untouched.
    pub async fn fetch_all(&self) -> Result<(), SyncError> {
        match self.api.list().await {
            Ok(tasks) => {
                info!(count = tasks.len(), "fetched tasks");
                self.tasks.send_replace(tasks);
                Ok(())
            }
            Err(e) => {
                error!("error fetching tasks: {}", e);
                Err(e.into())
            }
        }
    }

    /// Create when the task has no id yet, otherwise replace it server-side
    pub async fn save(&self, task: Task) -> Result<(), SyncError> {
        match task.id.clone() {
            Some(id) => self.update(&id, task).await,
            None => self.create(task).await,
        }
    }

    pub async fn create(&self, task: Task) -> Result<(), SyncError> {
        if let Err(e) = self.api.create(&task).await {
            error!(title = %task.title, "error creating task: {}", e);
            return Err(e.into());
        }
        self.refresh().await;
        Ok(())
    }

    /// Full replacement, not a patch
    pub async fn update(&self, id: &TaskId, task: Task) -> Result<(), SyncError> {
        let task = Task {
            id: Some(id.clone()),
            ..task
        };
        if let Err(e) = self.api.update(id, &task).await {
            error!(%id, "error updating task: {}", e);
            return Err(e.into());
        }
        self.refresh().await;
        Ok(())
    }

    pub async fn delete(&self, id: &TaskId) -> Result<(), SyncError> {
        if let Err(e) = self.api.delete(id).await {
            error!(%id, "error deleting task: {}", e);
            return Err(e.into());
        }
        self.refresh().await;
        Ok(())
    }

    /// Flip `completed` on a task from the current list and send the full object back.
    /// An id missing from the list is logged and makes no request.
    pub async fn toggle_complete(&self, id: &TaskId) -> Result<(), SyncError> {
        let Some(task) = self.find(id) else {
            warn!(%id, "toggle requested for a task that is not in the list");
            return Err(SyncError::TaskNotFound(id.clone()));
        };
        self.update(id, task.toggled()).await
    }

    // Re-fetch after a mutation; its failure is already logged and does not
    // undo the mutation that preceded it.
    async fn refresh(&self) {
        let _ = self.fetch_all().await;
    }
}
