use super::dto::{ErrorResponse, HealthResponse, RootResponse, RunFailure, RunRequest, RunResponse};
use super::routes;
use crate::domain::{StopReason, Verdict};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::root_handler,
        routes::health::health_handler,
        routes::run::run_handler
    ),
    components(
        schemas(
            RunRequest,
            RunResponse,
            RunFailure,
            ErrorResponse,
            HealthResponse,
            RootResponse,
            Verdict,
            StopReason
        )
    ),
    tags(
        (name = "health", description = "Liveness probes"),
        (name = "run", description = "Execute a task through the tool-using agent")
    )
)]
pub(super) struct ApiDoc;
