//! Plain data shared by the orchestrator, the agent and the HTTP surface.

pub mod conversation;
pub mod outcome;
pub mod types;

pub use conversation::{Message, MessageKind, Task};
pub use outcome::{Outcome, StopReason, Verdict};
pub use types::{ChatMessage, MessageRole};
