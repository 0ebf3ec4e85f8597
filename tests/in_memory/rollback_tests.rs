//! Repeated failed placements.

use super::helpers::{loaded_board, local, task, task_id};
use board_placement::placement::{
    domain::{BoardView, Container, FailureCategory, TaskStatus, TaskType},
    ports::SyncClientError,
    services::PlacementOutcome,
};
use eyre::{bail, ensure};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_moves_in_a_row_restore_the_original_placement() -> eyre::Result<()> {
    let h = loaded_board(
        BoardView::StatusBoard,
        vec![task(1, TaskType::Story, TaskStatus::InProgress, Some(9))?],
        Some(9),
    )
    .await?;
    let one = task_id(1)?;
    let original = local(&h, 1)?;
    h.server.fail_next(one, SyncClientError::Timeout)?;
    h.server.fail_next(
        one,
        SyncClientError::Server {
            status: 503,
            message: "maintenance".to_owned(),
        },
    )?;
    h.server.fail_next(
        one,
        SyncClientError::transport(std::io::Error::other("connection reset")),
    )?;

    for destination in [TaskStatus::Done, TaskStatus::Review, TaskStatus::Todo] {
        let outcome = h.board.move_task(one, Container::Status(destination)).await?;
        let PlacementOutcome::RolledBack(failure) = outcome else {
            bail!("expected rollback moving to {destination}, got {outcome:?}");
        };
        ensure!(failure.task_id() == one);
    }

    h.board.set_view(BoardView::BacklogSplit);
    h.server.fail_next(one, SyncClientError::Timeout)?;
    let to_backlog = h.board.move_task(one, Container::Backlog).await?;
    ensure!(matches!(to_backlog, PlacementOutcome::RolledBack(_)));

    ensure!(local(&h, 1)? == original, "local record drifted after rollbacks");
    let categories: Vec<FailureCategory> =
        h.surface.notices().iter().map(|notice| notice.category).collect();
    ensure!(
        categories
            == vec![
                FailureCategory::TransportFailure,
                FailureCategory::ServerError,
                FailureCategory::TransportFailure,
                FailureCategory::TransportFailure,
            ],
        "unexpected notices {categories:?}"
    );
    ensure!(h.server.placement_request_count()? == 4);
    ensure!(!h.board.guard().is_in_flight(one));
    Ok(())
}
