//! Shared world state for placement BDD scenarios.

use board_placement::placement::{
    adapters::memory::{CollectingErrorSurface, InMemorySyncClient},
    domain::{
        BoardScope, BoardView, PlacementPolicy, Sprint, SprintId, Task, TaskDetails, TaskId,
        TaskStatus, TaskType,
    },
    services::{BoardService, PlacementOutcome},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Board service type used by the BDD world.
pub type TestBoard = BoardService<InMemorySyncClient, CollectingErrorSurface, DefaultClock>;

/// Scenario world for placement behaviour tests.
pub struct PlacementWorld {
    /// Server the board syncs with.
    pub server: InMemorySyncClient,
    /// Notices reported by the board.
    pub surface: CollectingErrorSurface,
    /// Board under test, created by the first `Given` step.
    pub board: Option<TestBoard>,
    /// Active sprint of the board, when one is set.
    pub active_sprint: Option<SprintId>,
    /// Outcome of the last move.
    pub last_outcome: Option<PlacementOutcome>,
}

impl PlacementWorld {
    /// Creates a world with an empty server and no board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            server: InMemorySyncClient::new(),
            surface: CollectingErrorSurface::new(),
            board: None,
            active_sprint: None,
            last_outcome: None,
        }
    }

    /// Creates a board over the world's server and loads its sprint.
    pub fn open_board(&mut self, view: BoardView, sprint: u64) -> Result<(), eyre::Report> {
        let sprint_id = SprintId::new(sprint)?;
        self.server
            .set_latest_sprint(Some(Sprint::new(sprint_id, format!("Sprint {sprint}"))))?;
        let board = BoardService::new(
            BoardScope::from_parts(1, "scrum")?,
            view,
            PlacementPolicy::default(),
            Arc::new(self.server.clone()),
            Arc::new(self.surface.clone()),
            Arc::new(DefaultClock),
        );
        run_async(board.refresh_active_sprint())?;
        self.active_sprint = Some(sprint_id);
        self.board = Some(board);
        Ok(())
    }

    /// Returns the board, failing when no `Given` step created one.
    pub fn board(&self) -> Result<&TestBoard, eyre::Report> {
        self.board
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no board in scenario world"))
    }

    /// Seeds a task on the server and reloads the board's task list.
    pub fn seed_task(
        &self,
        id: u64,
        kind: &str,
        status: &str,
        sprint_id: Option<SprintId>,
    ) -> Result<(), eyre::Report> {
        let task = Task::new(
            TaskId::new(id)?,
            TaskType::from_label(kind),
            TaskStatus::try_from(status)?,
        )
        .with_sprint(sprint_id)
        .with_details(TaskDetails::titled(format!("{kind} {id}")));
        self.server.seed_tasks([task])?;
        run_async(self.board()?.refresh_tasks())?;
        Ok(())
    }

    /// Returns the board's local record of a task.
    pub fn local_task(&self, id: u64) -> Result<Task, eyre::Report> {
        self.board()?
            .store()
            .get(TaskId::new(id)?)?
            .ok_or_else(|| eyre::eyre!("task {id} is not loaded"))
    }

    /// Returns the outcome of the last move.
    pub fn outcome(&self) -> Result<&PlacementOutcome, eyre::Report> {
        self.last_outcome
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no move recorded in scenario world"))
    }
}

impl Default for PlacementWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PlacementWorld {
    PlacementWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
