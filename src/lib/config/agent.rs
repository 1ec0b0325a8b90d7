use super::defaults::{
    DEFAULT_AGENT_NAME, DEFAULT_MAX_TURNS, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TERMINATION_TOKEN,
};
use serde::Deserialize;

/// Settings for the single participant and the conversation it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub name: String,
    pub model: String,
    pub system_prompt: String,
    pub max_turns: usize,
    pub termination_token: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from(RawAgent::default())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct RawAgent {
    name: Option<String>,
    model: Option<String>,
    system_prompt: Option<String>,
    max_turns: Option<usize>,
    termination_token: Option<String>,
}

impl From<RawAgent> for AgentConfig {
    fn from(raw: RawAgent) -> Self {
        Self {
            name: raw.name.unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
            model: raw.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            system_prompt: raw
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            max_turns: raw.max_turns.unwrap_or(DEFAULT_MAX_TURNS),
            termination_token: raw
                .termination_token
                .unwrap_or_else(|| DEFAULT_TERMINATION_TOKEN.to_string()),
        }
    }
}
