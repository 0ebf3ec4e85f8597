//! Shared test helpers for in-memory placement integration tests.

use board_placement::placement::{
    adapters::memory::{CollectingErrorSurface, InMemorySyncClient},
    domain::{
        BoardScope, BoardView, PlacementPolicy, ProjectId, Sprint, SprintId, Task, TaskDetails,
        TaskId, TaskStatus, TaskType, TemplateType,
    },
    services::BoardService,
};
use eyre::bail;
use mockable::DefaultClock;
use std::sync::Arc;
use std::time::Duration;

/// Board service type used by the integration tests.
pub type TestBoard = BoardService<InMemorySyncClient, CollectingErrorSurface, DefaultClock>;

/// A board wired to an in-memory server and a collecting error surface.
pub struct Harness {
    /// The board under test.
    pub board: Arc<TestBoard>,
    /// The in-memory server the board syncs with.
    pub server: InMemorySyncClient,
    /// Notices reported by the board.
    pub surface: CollectingErrorSurface,
}

/// Builds a task identifier.
///
/// # Errors
///
/// Returns an error when `value` is zero.
pub fn task_id(value: u64) -> eyre::Result<TaskId> {
    Ok(TaskId::new(value)?)
}

/// Builds a titled task.
///
/// # Errors
///
/// Returns an error when either identifier is zero.
pub fn task(
    id: u64,
    task_type: TaskType,
    status: TaskStatus,
    sprint: Option<u64>,
) -> eyre::Result<Task> {
    let sprint_id = sprint.map(SprintId::new).transpose()?;
    Ok(Task::new(task_id(id)?, task_type, status)
        .with_sprint(sprint_id)
        .with_details(TaskDetails::titled(format!("Task {id}"))))
}

/// Seeds a server, then creates and loads a board over it.
///
/// # Errors
///
/// Returns an error when seeding or loading fails.
pub async fn loaded_board(
    view: BoardView,
    tasks: Vec<Task>,
    active_sprint: Option<u64>,
) -> eyre::Result<Harness> {
    let server = InMemorySyncClient::new();
    server.seed_tasks(tasks)?;
    let sprint = active_sprint
        .map(|id| SprintId::new(id).map(|sprint_id| Sprint::new(sprint_id, format!("Sprint {id}"))))
        .transpose()?;
    server.set_latest_sprint(sprint)?;

    let surface = CollectingErrorSurface::new();
    let board = Arc::new(BoardService::new(
        BoardScope::new(ProjectId::new(1)?, TemplateType::new("scrum")?),
        view,
        PlacementPolicy::default(),
        Arc::new(server.clone()),
        Arc::new(surface.clone()),
        Arc::new(DefaultClock),
    ));
    board.load().await?;
    Ok(Harness {
        board,
        server,
        surface,
    })
}

/// Returns the board's local record of a task.
///
/// # Errors
///
/// Returns an error when the task is not loaded.
pub fn local(harness: &Harness, id: u64) -> eyre::Result<Task> {
    harness
        .board
        .store()
        .get(task_id(id)?)?
        .ok_or_else(|| eyre::eyre!("task {id} is not loaded"))
}

/// Waits until the server has received `count` placement requests.
///
/// # Errors
///
/// Returns an error when the requests do not arrive within a second.
pub async fn wait_for_placement_requests(
    server: &InMemorySyncClient,
    count: usize,
) -> eyre::Result<()> {
    for _ in 0..200 {
        if server.placement_request_count()? >= count {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    bail!("timed out waiting for {count} placement requests")
}
