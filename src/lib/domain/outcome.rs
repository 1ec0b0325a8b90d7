use serde::Serialize;
use utoipa::ToSchema;

/// Why the scheduler stopped producing turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TerminationSignaled,
    TurnLimitReached,
    /// The message sink closed before a terminal condition was reached.
    StreamClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    CompletedWithErrors,
}

/// Result of a completed run handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Outcome {
    /// Joined transcript with the verdict annotation appended.
    pub transcript: String,
    pub verdict: Verdict,
    pub stop_reason: StopReason,
    /// Number of participant turns taken, excluding the task message.
    pub turns: usize,
}
