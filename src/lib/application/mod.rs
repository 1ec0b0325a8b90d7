//! # Application Module
//!
//! Core logic of the task runner.
//!
//! ## Submodules
//!
//! - [`tooling`] - MCP tool server connection and tool discovery
//! - [`agent`] - Model-backed participant that answers with tool calls or text
//! - [`orchestrator`] - Turn scheduling, transcript aggregation and verdicts

pub mod agent;
pub mod orchestrator;
pub mod tooling;
