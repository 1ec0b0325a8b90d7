//! Task and message types flowing through a single run.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Source tag used for the task message that opens every run.
pub const TASK_SOURCE: &str = "user";

/// A non-empty instruction submitted by a caller.
///
/// The only way to obtain a `Task` is [`Task::new`], so the orchestrator never
/// sees blank input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task(String);

impl Task {
    /// Returns `None` when the text is empty or whitespace only.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The caller's task, echoed as the first event of the stream.
    Task,
    Text,
    ToolResult,
    Error,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Task => "task",
            MessageKind::Text => "text",
            MessageKind::ToolResult => "tool_result",
            MessageKind::Error => "error",
        }
    }
}

/// One event produced during a run. Ordinals are assigned by the scheduler
/// and strictly increase from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Message {
    pub ordinal: u64,
    pub source: String,
    pub kind: MessageKind,
    pub content: String,
}

impl Message {
    pub fn task(task: &Task) -> Self {
        Self {
            ordinal: 0,
            source: TASK_SOURCE.to_string(),
            kind: MessageKind::Task,
            content: task.as_str().to_string(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.source, self.kind.as_str(), self.content)
    }
}
