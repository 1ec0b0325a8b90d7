//! HTTP surface: health probes, the `/run` endpoint and the OpenAPI document.

mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use dto::{ErrorResponse, HealthResponse, RootResponse, RunFailure, RunRequest, RunResponse};
pub use error::ServerError;
pub use router::build_router;
pub use state::ServerState;

use crate::application::orchestrator::TaskOrchestrator;
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn serve(orchestrator: Arc<TaskOrchestrator>, addr: SocketAddr) -> Result<(), ServerError> {
    router::serve(orchestrator, addr).await
}
