//! In-memory sync client for placement tests and offline flows.

use crate::placement::{
    domain::{BoardScope, PlacementChange, Sprint, SprintId, Task, TaskId, TaskStatus},
    ports::{SyncClient, SyncClientError, SyncClientResult},
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Semaphore;

/// A request observed by [`InMemorySyncClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    /// `update_status` call.
    UpdateStatus {
        /// Target task.
        task_id: TaskId,
        /// Requested status.
        status: TaskStatus,
    },
    /// `update_sprint_assignment` call.
    UpdateSprint {
        /// Target task.
        task_id: TaskId,
        /// Requested sprint, `None` for the backlog.
        sprint_id: Option<SprintId>,
    },
    /// `list_tasks` call.
    ListTasks,
    /// `latest_sprint` call.
    LatestSprint,
}

/// Deterministic stand-in for the remote system of record.
///
/// Placement requests mutate the seeded tasks and return the stored record.
/// Failures can be scripted per task, and requests for a task can be held
/// in flight until explicitly let go.
#[derive(Debug, Clone, Default)]
pub struct InMemorySyncClient {
    state: Arc<RwLock<InMemoryServerState>>,
}

#[derive(Debug, Default)]
struct InMemoryServerState {
    tasks: HashMap<TaskId, Task>,
    latest_sprint: Option<Sprint>,
    scripted_failures: HashMap<TaskId, VecDeque<SyncClientError>>,
    gates: HashMap<TaskId, Arc<Semaphore>>,
    requests: Vec<SyncRequest>,
}

fn lock_error(message: String) -> SyncClientError {
    SyncClientError::transport(std::io::Error::other(message))
}

impl InMemorySyncClient {
    /// Creates an empty server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> SyncClientResult<RwLockReadGuard<'_, InMemoryServerState>> {
        self.state.read().map_err(|err| lock_error(err.to_string()))
    }

    fn write(&self) -> SyncClientResult<RwLockWriteGuard<'_, InMemoryServerState>> {
        self.state.write().map_err(|err| lock_error(err.to_string()))
    }

    /// Stores or replaces server-side task records.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn seed_tasks(&self, tasks: impl IntoIterator<Item = Task>) -> SyncClientResult<()> {
        let mut state = self.write()?;
        for task in tasks {
            state.tasks.insert(task.id(), task);
        }
        Ok(())
    }

    /// Deletes a task on the server side.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn delete_task(&self, task_id: TaskId) -> SyncClientResult<Option<Task>> {
        Ok(self.write()?.tasks.remove(&task_id))
    }

    /// Sets the sprint returned as the latest one.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_latest_sprint(&self, sprint: Option<Sprint>) -> SyncClientResult<()> {
        self.write()?.latest_sprint = sprint;
        Ok(())
    }

    /// Queues an error returned by the next placement request for
    /// `task_id`. Queued errors are consumed in order.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn fail_next(&self, task_id: TaskId, error: SyncClientError) -> SyncClientResult<()> {
        self.write()?
            .scripted_failures
            .entry(task_id)
            .or_default()
            .push_back(error);
        Ok(())
    }

    /// Makes placement requests for `task_id` wait until
    /// [`InMemorySyncClient::release`] is called.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn hold(&self, task_id: TaskId) -> SyncClientResult<()> {
        self.write()?
            .gates
            .entry(task_id)
            .or_insert_with(|| Arc::new(Semaphore::new(0)));
        Ok(())
    }

    /// Lets held requests for `task_id` proceed.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn release(&self, task_id: TaskId) -> SyncClientResult<()> {
        if let Some(gate) = self.write()?.gates.remove(&task_id) {
            gate.close();
        }
        Ok(())
    }

    /// Returns the server-side record of a task.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn task(&self, task_id: TaskId) -> SyncClientResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&task_id).cloned())
    }

    /// Returns every request received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn requests(&self) -> SyncClientResult<Vec<SyncRequest>> {
        Ok(self.read()?.requests.clone())
    }

    /// Returns the number of placement writes received so far.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn placement_request_count(&self) -> SyncClientResult<usize> {
        Ok(self
            .read()?
            .requests
            .iter()
            .filter(|request| {
                matches!(
                    request,
                    SyncRequest::UpdateStatus { .. } | SyncRequest::UpdateSprint { .. }
                )
            })
            .count())
    }

    /// Records the request and returns the gate to wait on, if any.
    fn record(
        &self,
        request: SyncRequest,
        task_id: Option<TaskId>,
    ) -> SyncClientResult<Option<Arc<Semaphore>>> {
        let mut state = self.write()?;
        state.requests.push(request);
        Ok(task_id.and_then(|id| state.gates.get(&id).cloned()))
    }

    async fn write_placement(
        &self,
        request: SyncRequest,
        task_id: TaskId,
        change: PlacementChange,
    ) -> SyncClientResult<Task> {
        if let Some(gate) = self.record(request, Some(task_id))? {
            // The gate never hands out permits; it resolves once closed.
            drop(gate.acquire().await);
        }

        let mut state = self.write()?;
        if let Some(error) = state
            .scripted_failures
            .get_mut(&task_id)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or(SyncClientError::NotFound(task_id))?;
        task.apply_change(change);
        Ok(task.clone())
    }
}

#[async_trait]
impl SyncClient for InMemorySyncClient {
    async fn update_status(
        &self,
        _scope: &BoardScope,
        task_id: TaskId,
        status: TaskStatus,
    ) -> SyncClientResult<Task> {
        self.write_placement(
            SyncRequest::UpdateStatus { task_id, status },
            task_id,
            PlacementChange::Status(status),
        )
        .await
    }

    async fn update_sprint_assignment(
        &self,
        _scope: &BoardScope,
        task_id: TaskId,
        sprint_id: Option<SprintId>,
    ) -> SyncClientResult<Task> {
        self.write_placement(
            SyncRequest::UpdateSprint { task_id, sprint_id },
            task_id,
            PlacementChange::Sprint(sprint_id),
        )
        .await
    }

    async fn list_tasks(&self, _scope: &BoardScope) -> SyncClientResult<Vec<Task>> {
        self.record(SyncRequest::ListTasks, None)?;
        let mut tasks: Vec<Task> = self.read()?.tasks.values().cloned().collect();
        tasks.sort_by_key(Task::id);
        Ok(tasks)
    }

    async fn latest_sprint(&self, _scope: &BoardScope) -> SyncClientResult<Option<Sprint>> {
        self.record(SyncRequest::LatestSprint, None)?;
        Ok(self.read()?.latest_sprint.clone())
    }
}
