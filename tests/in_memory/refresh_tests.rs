//! Reloading the board while placements are pending.

use super::helpers::{loaded_board, local, task, task_id, wait_for_placement_requests};
use board_placement::placement::{
    domain::{BoardView, Container, Sprint, SprintId, TaskStatus, TaskType},
    services::PlacementOutcome,
};
use eyre::ensure;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_keeps_the_in_flight_record() -> eyre::Result<()> {
    let h = loaded_board(
        BoardView::StatusBoard,
        vec![
            task(1, TaskType::Story, TaskStatus::Todo, Some(9))?,
            task(2, TaskType::Story, TaskStatus::Todo, Some(9))?,
        ],
        Some(9),
    )
    .await?;
    h.server.hold(task_id(1)?)?;
    let board = Arc::clone(&h.board);
    let pending = tokio::spawn(async move {
        board
            .move_task(task_id(1)?, Container::Status(TaskStatus::Done))
            .await
            .map_err(eyre::Report::from)
    });
    wait_for_placement_requests(&h.server, 1).await?;

    h.server
        .seed_tasks([task(2, TaskType::Story, TaskStatus::Review, Some(9))?])?;
    h.board.refresh_tasks().await?;

    ensure!(local(&h, 1)?.status() == TaskStatus::Done, "in-flight write kept");
    ensure!(local(&h, 2)?.status() == TaskStatus::Review, "other tasks refreshed");

    h.server.release(task_id(1)?)?;
    ensure!(matches!(pending.await??, PlacementOutcome::Confirmed(_)));
    ensure!(local(&h, 1)?.status() == TaskStatus::Done);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_sprint_moves_tasks_onto_the_board() -> eyre::Result<()> {
    let h = loaded_board(
        BoardView::StatusBoard,
        vec![
            task(1, TaskType::Story, TaskStatus::Todo, Some(9))?,
            task(2, TaskType::Story, TaskStatus::InProgress, Some(10))?,
        ],
        Some(9),
    )
    .await?;
    ensure!(h.board.layout()?.task_count() == 1);

    h.server
        .set_latest_sprint(Some(Sprint::new(SprintId::new(10)?, "Sprint 10")))?;
    let layout = h.board.load().await?;

    ensure!(layout.container_of(task_id(1)?).is_none());
    ensure!(
        layout.container_of(task_id(2)?) == Some(Container::Status(TaskStatus::InProgress))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sprint_drop_without_active_sprint_is_rejected() -> eyre::Result<()> {
    let h = loaded_board(
        BoardView::BacklogSplit,
        vec![task(4, TaskType::Story, TaskStatus::Todo, None)?],
        None,
    )
    .await?;

    h.board.begin_drag("4", Container::Backlog)?;
    let outcome = h.board.finish_drag(Some(Container::Sprint)).await?;

    ensure!(matches!(outcome, PlacementOutcome::Rejected { .. }));
    ensure!(local(&h, 4)?.sprint_id().is_none());
    ensure!(h.server.placement_request_count()? == 0);
    Ok(())
}
