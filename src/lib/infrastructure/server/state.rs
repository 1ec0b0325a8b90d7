use crate::application::orchestrator::TaskOrchestrator;
use std::sync::Arc;

/// Shared by every request. Holds nothing mutable: each `/run` builds its own
/// session and transcript through the orchestrator.
pub struct ServerState {
    orchestrator: Arc<TaskOrchestrator>,
}

impl ServerState {
    pub fn new(orchestrator: Arc<TaskOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub(crate) fn orchestrator(&self) -> Arc<TaskOrchestrator> {
        Arc::clone(&self.orchestrator)
    }
}
