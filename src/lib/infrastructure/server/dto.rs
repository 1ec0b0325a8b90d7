use crate::domain::{Outcome, StopReason, Verdict};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RunRequest {
    /// Instruction for the agent. Blank or missing values are rejected.
    #[serde(default)]
    pub task: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunResponse {
    pub status: String,
    /// Transcript with the verdict note appended.
    pub result: String,
    pub verdict: Verdict,
    pub stop_reason: StopReason,
    pub turns: usize,
}

impl From<Outcome> for RunResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            status: "success".to_string(),
            result: outcome.transcript,
            verdict: outcome.verdict,
            stop_reason: outcome.stop_reason,
            turns: outcome.turns,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunFailure {
    pub status: String,
    pub result: String,
}

impl RunFailure {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            result: result.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}
