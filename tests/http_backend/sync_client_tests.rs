//! `HttpSyncClient` against the scripted backend.

use super::server::{Backend, GARBLED_TASK, MAINTENANCE_TASK, MISSING_TASK, SLOW_TASK};
use board_placement::placement::{
    adapters::HttpSyncClient,
    domain::{BoardScope, FailureCategory, SprintId, TaskId, TaskStatus, TaskType},
    ports::{SyncClient, SyncClientError},
};
use chrono::NaiveDate;
use eyre::{bail, ensure};
use rstest::rstest;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

fn client(backend: &Backend) -> eyre::Result<HttpSyncClient> {
    Ok(HttpSyncClient::new(
        backend.base_url(),
        Duration::from_millis(500),
    )?)
}

fn scope(project: u64) -> eyre::Result<BoardScope> {
    Ok(BoardScope::from_parts(project, "scrum")?)
}

fn template_query() -> HashMap<String, String> {
    HashMap::from([("templateType".to_owned(), "scrum".to_owned())])
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_update_patches_the_task_route() -> eyre::Result<()> {
    let backend = Backend::start().await?;
    let client = client(&backend)?.with_bearer_token("s3cret");

    let task = client
        .update_status(&scope(7)?, TaskId::new(4)?, TaskStatus::InProgress)
        .await?;

    ensure!(task.id() == TaskId::new(4)?);
    ensure!(task.status() == TaskStatus::InProgress);
    ensure!(task.sprint_id() == Some(SprintId::new(9)?));
    let request = backend.last_request()?;
    ensure!(request.method == "PATCH");
    ensure!(request.path == "/projects/7/tasks/4/status", "path {}", request.path);
    ensure!(
        request.body == Some(json!({ "status": "In Progress", "templateType": "scrum" })),
        "body {:?}",
        request.body
    );
    ensure!(request.authorization.as_deref() == Some("Bearer s3cret"));
    Ok(())
}

#[rstest]
#[case(Some(9), json!(9))]
#[case(None, json!(null))]
#[tokio::test(flavor = "multi_thread")]
async fn sprint_assignment_sends_the_sprint_or_null(
    #[case] sprint: Option<u64>,
    #[case] wire: serde_json::Value,
) -> eyre::Result<()> {
    let backend = Backend::start().await?;
    let sprint_id = sprint.map(SprintId::new).transpose()?;

    let task = client(&backend)?
        .update_sprint_assignment(&scope(7)?, TaskId::new(12)?, sprint_id)
        .await?;

    ensure!(task.sprint_id() == sprint_id, "sprint {:?}", task.sprint_id());
    ensure!(task.task_type() == TaskType::Bug);
    let request = backend.last_request()?;
    ensure!(request.path == "/projects/7/tasks/12/sprint", "path {}", request.path);
    ensure!(
        request.body == Some(json!({ "sprintId": wire, "templateType": "scrum" })),
        "body {:?}",
        request.body
    );
    ensure!(request.authorization.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_list_is_scoped_by_template_and_decoded() -> eyre::Result<()> {
    let backend = Backend::start().await?;

    let tasks = client(&backend)?.list_tasks(&scope(1)?).await?;

    let request = backend.last_request()?;
    ensure!(request.method == "GET");
    ensure!(request.path == "/projects/1/tasks");
    ensure!(request.query == template_query(), "query {:?}", request.query);

    let [wired, approval, spike] = tasks.as_slice() else {
        bail!("expected three tasks, got {tasks:?}");
    };
    ensure!(wired.status() == TaskStatus::InProgress);
    ensure!(wired.sprint_id() == Some(SprintId::new(9)?));
    ensure!(wired.details().title == "Wire the board");
    ensure!(wired.details().story_points == Some(3));
    ensure!(approval.is_approval());
    ensure!(approval.sprint_id().is_none(), "zero sprint means backlog");
    ensure!(spike.task_type() == TaskType::Other);
    ensure!(spike.status() == TaskStatus::Done);
    ensure!(spike.sprint_id().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn latest_sprint_is_decoded() -> eyre::Result<()> {
    let backend = Backend::start().await?;

    let sprint = client(&backend)?
        .latest_sprint(&scope(1)?)
        .await?
        .ok_or_else(|| eyre::eyre!("expected an active sprint"))?;

    ensure!(sprint.id() == SprintId::new(9)?);
    ensure!(sprint.name() == "Sprint 9");
    ensure!(sprint.goal() == Some("Ship drag and drop"));
    ensure!(sprint.start_date() == NaiveDate::from_ymd_opt(2026, 10, 5));
    let request = backend.last_request()?;
    ensure!(request.path == "/projects/1/sprints/latest");
    ensure!(request.query == template_query(), "query {:?}", request.query);
    Ok(())
}

#[rstest]
#[case::null_body(2)]
#[case::not_found(3)]
#[case::zero_sprint(4)]
#[tokio::test(flavor = "multi_thread")]
async fn absent_sprint_answers_mean_no_sprint(#[case] project: u64) -> eyre::Result<()> {
    let backend = Backend::start().await?;

    let sprint = client(&backend)?.latest_sprint(&scope(project)?).await?;

    ensure!(sprint.is_none(), "project {project} gave {sprint:?}");
    ensure!(backend.requests().len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn maintenance_maps_to_a_server_error() -> eyre::Result<()> {
    let backend = Backend::start().await?;

    let result = client(&backend)?
        .update_status(&scope(7)?, TaskId::new(MAINTENANCE_TASK)?, TaskStatus::Done)
        .await;

    let Err(err) = result else {
        bail!("expected a failure, got {result:?}");
    };
    ensure!(err.category() == FailureCategory::ServerError);
    ensure!(
        matches!(
            &err,
            SyncClientError::Server { status: 503, message } if message == "maintenance window"
        ),
        "unexpected error {err:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_task_maps_to_not_found() -> eyre::Result<()> {
    let backend = Backend::start().await?;
    let missing = TaskId::new(MISSING_TASK)?;

    let result = client(&backend)?
        .update_sprint_assignment(&scope(7)?, missing, None)
        .await;

    ensure!(
        matches!(result, Err(SyncClientError::NotFound(id)) if id == missing),
        "unexpected result {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_listing_keeps_the_plain_text_reason() -> eyre::Result<()> {
    let backend = Backend::start().await?;

    let result = client(&backend)?.list_tasks(&scope(5)?).await;

    ensure!(
        matches!(
            &result,
            Err(SyncClientError::Server { status: 500, message }) if message == "database unavailable"
        ),
        "unexpected result {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undecodable_record_is_a_transport_failure() -> eyre::Result<()> {
    let backend = Backend::start().await?;

    let result = client(&backend)?
        .update_status(&scope(7)?, TaskId::new(GARBLED_TASK)?, TaskStatus::Todo)
        .await;

    ensure!(
        matches!(result, Err(SyncClientError::Transport(_))),
        "unexpected result {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_answer_times_out() -> eyre::Result<()> {
    let backend = Backend::start().await?;

    let result = client(&backend)?
        .update_status(&scope(7)?, TaskId::new(SLOW_TASK)?, TaskStatus::Review)
        .await;

    ensure!(
        matches!(result, Err(SyncClientError::Timeout)),
        "unexpected result {result:?}"
    );
    Ok(())
}
