use super::directive::{AgentDirective, parse_agent_action};
use super::errors::{ConfigurationError, TurnExecutionError};
use super::execution;
use super::instructions::{
    JSON_RETRY_MESSAGE, TOOL_FAILURE_INSTRUCTION, TOOL_RESULT_INSTRUCTION,
    compose_system_instructions,
};
use crate::application::tooling::ToolDescriptor;
use crate::domain::{ChatMessage, Message, MessageKind};
use crate::model::{ModelProvider, ModelRequest};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Correction requests allowed within one turn after an unparseable reply.
const MAX_JSON_RETRIES: u8 = 2;

/// What a participant produced for one turn, before the scheduler stamps it
/// with an ordinal and source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub kind: MessageKind,
    pub content: String,
}

impl TurnReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: content.into(),
        }
    }

    pub fn tool_result(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::ToolResult,
            content: content.into(),
        }
    }
}

/// One conversational agent taking turns in a run.
///
/// `thread` is every message emitted so far in the run, task first.
#[async_trait]
pub trait Participant: Send + Sync {
    fn name(&self) -> &str;

    async fn take_turn(&self, thread: &[Message]) -> Result<TurnReply, TurnExecutionError>;
}

/// Model-backed participant that answers with the JSON action protocol and
/// may call one tool per turn.
pub struct AssistantParticipant {
    name: String,
    instructions: String,
    model: Arc<dyn ModelProvider>,
    model_id: String,
    tools: Vec<ToolDescriptor>,
}

impl AssistantParticipant {
    /// Binds prompt, model handle and tools. Performs no I/O.
    pub fn configure(
        name: impl Into<String>,
        system_prompt: &str,
        model: Arc<dyn ModelProvider>,
        model_id: impl Into<String>,
        tools: Vec<ToolDescriptor>,
        server_guidance: Option<&str>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        let model_id = model_id.into();
        if model_id.trim().is_empty() {
            return Err(ConfigurationError::EmptyModel);
        }

        let mut seen = HashSet::new();
        for (index, tool) in tools.iter().enumerate() {
            if tool.name.trim().is_empty() {
                return Err(ConfigurationError::UnnamedTool { index });
            }
            if !seen.insert(tool.name.to_lowercase()) {
                return Err(ConfigurationError::DuplicateTool {
                    name: tool.name.clone(),
                });
            }
        }

        let instructions = compose_system_instructions(system_prompt, &tools, server_guidance);
        info!(
            participant = %name,
            model = %model_id,
            tools = tools.len(),
            "Configured assistant participant"
        );
        Ok(Self {
            name,
            instructions,
            model,
            model_id,
            tools,
        })
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Rebuilds the model context from the shared thread.
    fn build_messages(&self, thread: &[Message]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(thread.len() + 1);
        messages.push(ChatMessage::system(self.instructions.clone()));

        for message in thread {
            let own = message.source == self.name;
            let chat = match message.kind {
                MessageKind::Task => ChatMessage::user(
                    json!({ "action": "user_request", "prompt": message.content }).to_string(),
                ),
                MessageKind::Text if own => ChatMessage::assistant(
                    json!({ "action": "final", "response": message.content }).to_string(),
                ),
                MessageKind::ToolResult if own => {
                    let result = serde_json::from_str::<Value>(&message.content)
                        .unwrap_or_else(|_| Value::String(message.content.clone()));
                    ChatMessage::user(
                        json!({ "tool_result": result, "instruction": TOOL_RESULT_INSTRUCTION })
                            .to_string(),
                    )
                }
                MessageKind::Error if own => ChatMessage::user(
                    json!({ "error": message.content, "instruction": TOOL_FAILURE_INSTRUCTION })
                        .to_string(),
                ),
                _ => ChatMessage::user(format!("{}: {}", message.source, message.content)),
            };
            messages.push(chat);
        }

        messages
    }

    async fn ask(&self, messages: &[ChatMessage]) -> Result<String, TurnExecutionError> {
        let response = self
            .model
            .chat(ModelRequest::new(self.model_id.clone(), messages.to_vec()))
            .await?;
        Ok(response.content().to_string())
    }

    async fn next_directive(
        &self,
        mut messages: Vec<ChatMessage>,
    ) -> Result<AgentDirective, TurnExecutionError> {
        let mut content = self.ask(&messages).await?;
        let mut retries = 0u8;

        loop {
            match parse_agent_action(&content) {
                Ok(directive) => return Ok(directive),
                Err(reason) if retries < MAX_JSON_RETRIES => {
                    retries += 1;
                    warn!(
                        participant = %self.name,
                        attempt = retries,
                        max_attempts = MAX_JSON_RETRIES,
                        %reason,
                        "Unparseable reply, requesting correction from model"
                    );
                    messages.push(ChatMessage::assistant(content));
                    messages.push(ChatMessage::user(format!(
                        "{JSON_RETRY_MESSAGE}\n\nError details: {reason}"
                    )));
                    content = self.ask(&messages).await?;
                }
                Err(reason) => {
                    return Err(TurnExecutionError::InvalidResponse(format!(
                        "unparseable after {MAX_JSON_RETRIES} corrections: {reason}"
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl Participant for AssistantParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn take_turn(&self, thread: &[Message]) -> Result<TurnReply, TurnExecutionError> {
        let messages = self.build_messages(thread);
        debug!(
            participant = %self.name,
            history = messages.len(),
            "Submitting turn to model provider"
        );

        match self.next_directive(messages).await? {
            AgentDirective::Final { response } => Ok(TurnReply::text(response)),
            AgentDirective::CallTool { tool, input } => {
                info!(participant = %self.name, tool = %tool, "Agent requested tool execution");
                let execution = execution::execute(&self.tools, &tool, input).await?;
                Ok(TurnReply::tool_result(execution.to_content()))
            }
        }
    }
}
