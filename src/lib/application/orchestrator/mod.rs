//! # Orchestrator Module
//!
//! Runs one task end to end: resolve the tool server, configure the agent,
//! drive turns into a bounded channel while a consumer builds the
//! transcript, then classify the result.
//!
//! Every call to [`TaskOrchestrator::execute_task`] builds its own session,
//! participant, channel and transcript. The orchestrator itself only holds
//! immutable settings and shared handles.

mod aggregator;
mod classifier;
mod scheduler;
mod termination;

pub use aggregator::{MESSAGE_SEPARATOR, StreamAggregator, Transcript};
pub use classifier::{Classification, ERROR_NOTE, SUCCESS_NOTE, classify};
pub use scheduler::{RoundRobinScheduler, ScheduleSummary, TurnState};
pub use termination::{TerminationCondition, TextMention};

use crate::application::agent::{AssistantParticipant, ConfigurationError, Participant};
use crate::application::tooling::{McpToolResolver, ToolResolutionError, ToolResolver};
use crate::config::{AgentConfig, AppConfig, ServerConfig};
use crate::domain::{Outcome, Task};
use crate::model::{ModelError, ModelProvider, ProviderFactory};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    ToolResolution(#[from] ToolResolutionError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Per-run parameters taken from the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub agent: AgentConfig,
    pub tool_server: ServerConfig,
}

impl From<&AppConfig> for RunSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            agent: config.agent.clone(),
            tool_server: config.tool_server.clone(),
        }
    }
}

pub struct TaskOrchestrator {
    settings: RunSettings,
    model: Arc<dyn ModelProvider>,
    resolver: Arc<dyn ToolResolver>,
}

impl TaskOrchestrator {
    pub fn new(
        settings: RunSettings,
        model: Arc<dyn ModelProvider>,
        resolver: Arc<dyn ToolResolver>,
    ) -> Self {
        Self {
            settings,
            model,
            resolver,
        }
    }

    /// Wires the configured model provider and a stdio MCP resolver.
    pub fn from_config(config: &AppConfig) -> Result<Self, ModelError> {
        let model = ProviderFactory::create(&config.provider)?;
        Ok(Self::new(
            RunSettings::from(config),
            model,
            Arc::new(McpToolResolver),
        ))
    }

    pub async fn execute_task(&self, task: Task) -> Result<Outcome, OrchestratorError> {
        let agent = &self.settings.agent;
        info!(
            agent = %agent.name,
            server = %self.settings.tool_server.name,
            max_turns = agent.max_turns,
            "Executing task"
        );

        let session = self.resolver.resolve(&self.settings.tool_server).await?;
        let guidance = session.instructions().await;

        let participant = match AssistantParticipant::configure(
            agent.name.clone(),
            &agent.system_prompt,
            Arc::clone(&self.model),
            agent.model.clone(),
            session.tools().to_vec(),
            guidance.as_deref(),
        ) {
            Ok(participant) => participant,
            Err(err) => {
                warn!(error = %err, "Agent configuration rejected");
                session.close().await;
                return Err(err.into());
            }
        };

        let participants: Vec<Arc<dyn Participant>> = vec![Arc::new(participant)];
        let result = run_conversation(
            &task,
            participants,
            agent.max_turns,
            &agent.termination_token,
        )
        .await;
        session.close().await;

        let outcome = result?;
        info!(
            verdict = ?outcome.verdict,
            stop_reason = ?outcome.stop_reason,
            turns = outcome.turns,
            "Task finished"
        );
        Ok(outcome)
    }
}

/// Schedules `participants` over `task` and classifies the transcript.
///
/// The scheduler and the aggregator run concurrently on one bounded channel
/// sized to hold a whole run.
pub async fn run_conversation(
    task: &Task,
    participants: Vec<Arc<dyn Participant>>,
    max_turns: usize,
    termination_token: &str,
) -> Result<Outcome, ConfigurationError> {
    if termination_token.is_empty() {
        return Err(ConfigurationError::EmptyTerminationToken);
    }
    let scheduler =
        RoundRobinScheduler::new(participants, max_turns, TextMention::new(termination_token))?;

    let (sender, receiver) = mpsc::channel(max_turns.saturating_add(1));
    let (summary, transcript) = tokio::join!(
        scheduler.run(task, sender),
        StreamAggregator::new().drain(receiver)
    );

    let Classification { verdict, annotated } = classify(transcript.text());
    Ok(Outcome {
        transcript: annotated,
        verdict,
        stop_reason: summary.stop_reason,
        turns: summary.turns,
    })
}
