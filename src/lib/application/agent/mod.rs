//! # Agent Module
//!
//! Model-backed conversation participants. An agent answers each turn with a
//! JSON action, either a final response or a single tool call that is
//! executed before the turn ends.
//!
//! ## Key Types
//!
//! - [`Participant`] - One side of a turn-based conversation
//! - [`AssistantParticipant`] - The tool-using agent bound to a model
//! - [`TurnReply`] - What a participant produced for one turn
//! - [`ConfigurationError`] - Invalid agent or conversation setup
//! - [`TurnExecutionError`] - A failed turn, recorded and survived

mod directive;
mod errors;
mod execution;
mod instructions;
mod participant;

pub use directive::{AgentDirective, parse_agent_action};
pub use errors::{ConfigurationError, ToolError, TurnExecutionError};
pub use participant::{AssistantParticipant, Participant, TurnReply};
