use super::docs::ApiDoc;
use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::application::orchestrator::TaskOrchestrator;
use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(orchestrator: Arc<TaskOrchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(ServerState::new(orchestrator));
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/", get(routes::health::root_handler))
        .route("/health", get(routes::health::health_handler))
        .route("/run", post(routes::run::run_handler))
        .layer(cors)
        .with_state(state)
}

pub(super) async fn serve(
    orchestrator: Arc<TaskOrchestrator>,
    addr: SocketAddr,
) -> Result<(), ServerError> {
    info!(%addr, "Binding REST server");
    let app = build_router(orchestrator);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}
