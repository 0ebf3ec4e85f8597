//! Per-task serialization of placement requests.

use super::helpers::{loaded_board, local, task, task_id, wait_for_placement_requests};
use board_placement::placement::{
    domain::{BoardView, Container, TaskStatus, TaskType},
    services::PlacementOutcome,
};
use eyre::ensure;
use rstest::rstest;
use std::sync::Arc;

const TODO: Container = Container::Status(TaskStatus::Todo);
const REVIEW: Container = Container::Status(TaskStatus::Review);
const DONE: Container = Container::Status(TaskStatus::Done);

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_move_of_an_in_flight_task_is_dropped() -> eyre::Result<()> {
    let h = loaded_board(
        BoardView::StatusBoard,
        vec![task(1, TaskType::Story, TaskStatus::Todo, Some(9))?],
        Some(9),
    )
    .await?;
    h.server.hold(task_id(1)?)?;

    let board = Arc::clone(&h.board);
    let first = tokio::spawn(async move {
        board
            .move_task(task_id(1)?, DONE)
            .await
            .map_err(eyre::Report::from)
    });
    wait_for_placement_requests(&h.server, 1).await?;

    ensure!(h.board.guard().is_in_flight(task_id(1)?));
    ensure!(local(&h, 1)?.status() == TaskStatus::Done, "optimistic write is visible");
    let second = h.board.move_task(task_id(1)?, REVIEW).await?;
    ensure!(second == PlacementOutcome::Dropped(task_id(1)?));

    h.server.release(task_id(1)?)?;
    let settled = first.await??;

    ensure!(matches!(settled, PlacementOutcome::Confirmed(_)));
    ensure!(h.server.placement_request_count()? == 1);
    ensure!(local(&h, 1)?.status() == TaskStatus::Done);
    ensure!(!h.board.guard().is_in_flight(task_id(1)?));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn different_tasks_move_concurrently() -> eyre::Result<()> {
    let h = loaded_board(
        BoardView::StatusBoard,
        vec![
            task(1, TaskType::Story, TaskStatus::Todo, Some(9))?,
            task(2, TaskType::Bug, TaskStatus::Todo, Some(9))?,
        ],
        Some(9),
    )
    .await?;
    h.server.hold(task_id(1)?)?;

    let board = Arc::clone(&h.board);
    let held = tokio::spawn(async move {
        board
            .move_task(task_id(1)?, DONE)
            .await
            .map_err(eyre::Report::from)
    });
    wait_for_placement_requests(&h.server, 1).await?;

    let other = h.board.move_task(task_id(2)?, REVIEW).await?;
    ensure!(matches!(other, PlacementOutcome::Confirmed(_)));

    h.server.release(task_id(1)?)?;
    ensure!(matches!(held.await??, PlacementOutcome::Confirmed(_)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_can_move_again_after_settling() -> eyre::Result<()> {
    let h = loaded_board(
        BoardView::StatusBoard,
        vec![task(1, TaskType::Story, TaskStatus::Todo, Some(9))?],
        Some(9),
    )
    .await?;

    h.board.move_task(task_id(1)?, DONE).await?;
    let back = h.board.move_task(task_id(1)?, TODO).await?;

    ensure!(matches!(back, PlacementOutcome::Confirmed(_)));
    ensure!(h.server.placement_request_count()? == 2);
    Ok(())
}
