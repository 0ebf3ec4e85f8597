//! In-memory task store the board renders from.

use crate::placement::domain::{Container, PlacementChange, SprintContext, Task, TaskId, classify};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::BuildHasher;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Errors returned by the task store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskStoreError {
    /// A task with the same identifier is already loaded.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task is not loaded.
    #[error("task not found in store: {0}")]
    NotFound(TaskId),

    /// A writer panicked while holding the store lock.
    #[error("task store lock poisoned: {0}")]
    Poisoned(String),
}

/// Thread-safe collection of the tasks of the open board.
///
/// Clones share the same underlying collection.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `tasks`. Later duplicates replace earlier ones.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let map = tasks.into_iter().map(|task| (task.id(), task)).collect();
        Self {
            state: Arc::new(RwLock::new(map)),
        }
    }

    fn read(&self) -> TaskStoreResult<RwLockReadGuard<'_, HashMap<TaskId, Task>>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::Poisoned(err.to_string()))
    }

    fn write(&self) -> TaskStoreResult<RwLockWriteGuard<'_, HashMap<TaskId, Task>>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::Poisoned(err.to_string()))
    }

    /// Adds a newly created task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the id is already
    /// loaded.
    pub fn insert(&self, task: Task) -> TaskStoreResult<()> {
        let mut tasks = self.write()?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task);
        Ok(())
    }

    /// Replaces the whole record for a task, inserting it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn upsert(&self, task: Task) -> TaskStoreResult<()> {
        self.write()?.insert(task.id(), task);
        Ok(())
    }

    /// Removes a task, returning its last record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn remove(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        Ok(self.write()?.remove(&id))
    }

    /// Drops every task, as when the board unmounts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn clear(&self) -> TaskStoreResult<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Replaces the contents with `tasks`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn replace_all(&self, tasks: impl IntoIterator<Item = Task>) -> TaskStoreResult<()> {
        *self.write()? = tasks.into_iter().map(|task| (task.id(), task)).collect();
        Ok(())
    }

    /// Replaces the contents with a fresh task list, keeping the local record
    /// of every id in `preserve` that is currently loaded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn reload<H: BuildHasher>(
        &self,
        fresh: impl IntoIterator<Item = Task>,
        preserve: &HashSet<TaskId, H>,
    ) -> TaskStoreResult<()> {
        let mut tasks = self.write()?;
        let mut next: HashMap<TaskId, Task> =
            fresh.into_iter().map(|task| (task.id(), task)).collect();
        for id in preserve {
            if let Some(local) = tasks.remove(id) {
                next.insert(*id, local);
            }
        }
        *tasks = next;
        Ok(())
    }

    /// Returns a task by id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn get(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Returns every task ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn all(&self) -> TaskStoreResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self.read()?.values().cloned().collect();
        tasks.sort_by_key(Task::id);
        Ok(tasks)
    }

    /// Returns the number of loaded tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn len(&self) -> TaskStoreResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns `true` when no task is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn is_empty(&self) -> TaskStoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Groups the loaded tasks by container for rendering.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the lock is poisoned.
    pub fn layout(&self, context: &SprintContext) -> TaskStoreResult<BoardLayout> {
        Ok(BoardLayout::build(self.all()?, context))
    }

    /// Replaces a task's record only when it is still loaded. Returns whether
    /// the record was replaced.
    pub(crate) fn replace_if_present(&self, task: Task) -> TaskStoreResult<bool> {
        let mut tasks = self.write()?;
        let Some(slot) = tasks.get_mut(&task.id()) else {
            return Ok(false);
        };
        *slot = task;
        Ok(true)
    }

    /// Writes a placement field and returns the updated record.
    pub(crate) fn apply_change(
        &self,
        id: TaskId,
        change: PlacementChange,
    ) -> TaskStoreResult<Task> {
        let mut tasks = self.write()?;
        let task = tasks.get_mut(&id).ok_or(TaskStoreError::NotFound(id))?;
        task.apply_change(change);
        Ok(task.clone())
    }
}

/// Tasks grouped by the container they are classified into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardLayout {
    columns: BTreeMap<Container, Vec<Task>>,
}

impl BoardLayout {
    /// Classifies `tasks` into containers, dropping excluded tasks. Column
    /// order follows the input order.
    #[must_use]
    pub fn build(tasks: impl IntoIterator<Item = Task>, context: &SprintContext) -> Self {
        let mut columns: BTreeMap<Container, Vec<Task>> = BTreeMap::new();
        for task in tasks {
            if let Some(container) = classify(&task, context) {
                columns.entry(container).or_default().push(task);
            }
        }
        Self { columns }
    }

    /// Returns the tasks in `container`.
    #[must_use]
    pub fn tasks_in(&self, container: Container) -> &[Task] {
        self.columns
            .get(&container)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the container holding the given task, if it is on the layout.
    #[must_use]
    pub fn container_of(&self, id: TaskId) -> Option<Container> {
        self.columns
            .iter()
            .find(|(_, tasks)| tasks.iter().any(|task| task.id() == id))
            .map(|(container, _)| *container)
    }

    /// Iterates over non-empty containers in board order.
    #[must_use]
    pub fn columns(&self) -> impl Iterator<Item = (Container, &[Task])> {
        self.columns
            .iter()
            .map(|(container, tasks)| (*container, tasks.as_slice()))
    }

    /// Returns the number of tasks on the layout.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }
}
