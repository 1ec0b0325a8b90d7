use super::super::dto::{ErrorResponse, RunFailure, RunRequest, RunResponse};
use super::super::state::ServerState;
use crate::domain::Task;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{error, info, warn};

const MISSING_TASK: &str = "Missing Task";

#[utoipa::path(
    post,
    path = "/run",
    tag = "run",
    request_body = RunRequest,
    responses(
        (status = 200, description = "Task ran to completion", body = RunResponse),
        (status = 400, description = "Task missing or blank", body = ErrorResponse),
        (status = 500, description = "Tool server or agent setup failed", body = RunFailure)
    )
)]
pub async fn run_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Response {
    let task = match payload {
        Ok(Json(request)) => request.task.and_then(Task::new),
        Err(rejection) => {
            warn!(error = %rejection, "Rejecting /run request with unreadable body");
            None
        }
    };

    let Some(task) = task else {
        warn!("Rejecting /run request without a task");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: MISSING_TASK.to_string(),
            }),
        )
            .into_response();
    };

    info!(task_len = task.as_str().len(), "Received /run request");
    match state.orchestrator().execute_task(task).await {
        Ok(outcome) => {
            info!(
                verdict = ?outcome.verdict,
                turns = outcome.turns,
                "Run completed"
            );
            (StatusCode::OK, Json(RunResponse::from(outcome))).into_response()
        }
        Err(err) => {
            error!(error = %err, "Run failed before producing a transcript");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RunFailure::new(err.to_string())),
            )
                .into_response()
        }
    }
}
