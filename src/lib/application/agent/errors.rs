use crate::application::tooling::ToolInvokeError;
use crate::model::ModelError;
use thiserror::Error;

/// Structurally invalid agent or conversation setup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("participant name must not be empty")]
    EmptyName,
    #[error("model identifier must not be empty")]
    EmptyModel,
    #[error("tool #{index} has an empty name")]
    UnnamedTool { index: usize },
    #[error("tool '{name}' is registered more than once")]
    DuplicateTool { name: String },
    #[error("a conversation needs at least one participant")]
    NoParticipants,
    #[error("max_turns must be at least 1")]
    ZeroTurns,
    #[error("termination token must not be empty")]
    EmptyTerminationToken,
}

/// Failure inside a single turn. The scheduler records it in the transcript
/// and keeps going.
#[derive(Debug, Error)]
pub enum TurnExecutionError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool requested: {0}")]
    UnknownTool(String),
    #[error("tool '{tool}' failed: {source}")]
    Execution {
        tool: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error("tool '{tool}' reported an error: {message}")]
    Reported { tool: String, message: String },
}
