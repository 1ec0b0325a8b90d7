// Shared stubs for integration tests: scripted participants, a scripted
// model provider and an in-memory tool server.
#![allow(dead_code)]

use async_trait::async_trait;
use mcp_task_runner::agent::{Participant, TurnExecutionError, TurnReply};
use mcp_task_runner::config::{AgentConfig, ServerConfig};
use mcp_task_runner::domain::Message;
use mcp_task_runner::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use mcp_task_runner::orchestrator::{RunSettings, TaskOrchestrator};
use mcp_task_runner::tooling::{
    ServerToolInfo, ToolConnection, ToolInvokeError, ToolResolutionError, ToolResolver,
    ToolSession,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Participant replaying canned replies, then repeating `fallback`.
pub struct ScriptedParticipant {
    name: String,
    replies: Mutex<VecDeque<Result<TurnReply, String>>>,
    fallback: String,
    thread_sizes: Mutex<Vec<usize>>,
}

impl ScriptedParticipant {
    pub fn new(name: &str, replies: Vec<Result<&str, &str>>, fallback: &str) -> Arc<Self> {
        let replies = replies
            .into_iter()
            .map(|reply| {
                reply
                    .map(TurnReply::text)
                    .map_err(|cause| cause.to_string())
            })
            .collect();
        Arc::new(Self {
            name: name.to_string(),
            replies: Mutex::new(replies),
            fallback: fallback.to_string(),
            thread_sizes: Mutex::new(Vec::new()),
        })
    }

    pub fn repeating(name: &str, text: &str) -> Arc<Self> {
        Self::new(name, Vec::new(), text)
    }

    pub fn turns_taken(&self) -> usize {
        self.thread_sizes.lock().expect("lock").len()
    }

    pub fn thread_sizes(&self) -> Vec<usize> {
        self.thread_sizes.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Participant for ScriptedParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn take_turn(&self, thread: &[Message]) -> Result<TurnReply, TurnExecutionError> {
        self.thread_sizes.lock().expect("lock").push(thread.len());
        let next = self.replies.lock().expect("lock").pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(cause)) => Err(TurnExecutionError::InvalidResponse(cause)),
            None => Ok(TurnReply::text(self.fallback.clone())),
        }
    }
}

/// Model provider answering from a script; an exhausted script is an error.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().expect("lock").pop_front();
        next.map(ModelResponse::new)
            .ok_or_else(|| ModelError::invalid_response("scripted", "script exhausted"))
    }
}

/// Model provider whose replies never arrive.
pub struct StalledProvider;

#[async_trait]
impl ModelProvider for StalledProvider {
    fn id(&self) -> &str {
        "stalled"
    }

    async fn chat(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        std::future::pending().await
    }
}

/// Tool server connection answering `tools/call` from a script.
pub struct StubConnection {
    results: Mutex<VecDeque<Result<Value, String>>>,
    calls: Mutex<Vec<String>>,
    closed: AtomicUsize,
}

impl StubConnection {
    pub fn new(results: Vec<Result<Value, &str>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(
                results
                    .into_iter()
                    .map(|result| result.map_err(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
        })
    }

    pub fn text_result(text: &str) -> Value {
        json!({ "content": [{ "type": "text", "text": text }], "isError": false })
    }

    pub fn flagged_result(text: &str) -> Value {
        json!({ "content": [{ "type": "text", "text": text }], "isError": true })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolConnection for StubConnection {
    fn server_name(&self) -> &str {
        "notion"
    }

    async fn call_tool(&self, tool: &str, _arguments: Value) -> Result<Value, ToolInvokeError> {
        self.calls.lock().expect("lock").push(tool.to_string());
        let next = self.results.lock().expect("lock").pop_front();
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(ToolInvokeError::Transport {
                server: "notion".into(),
                message,
            }),
            None => Ok(Self::text_result("nothing scripted")),
        }
    }

    async fn instructions(&self) -> Option<String> {
        None
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Resolver handing out sessions over one stub connection, or failing.
pub struct StubResolver {
    connection: Arc<StubConnection>,
    tools: Vec<ServerToolInfo>,
    unreachable: bool,
    resolves: AtomicUsize,
}

impl StubResolver {
    pub fn with_tools(connection: Arc<StubConnection>, names: &[&str]) -> Arc<Self> {
        let tools = names
            .iter()
            .map(|name| ServerToolInfo {
                name: name.to_string(),
                description: Some(format!("{name} tool")),
                input_schema: Some(json!({ "type": "object" })),
            })
            .collect();
        Arc::new(Self {
            connection,
            tools,
            unreachable: false,
            resolves: AtomicUsize::new(0),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            connection: StubConnection::new(Vec::new()),
            tools: Vec::new(),
            unreachable: true,
            resolves: AtomicUsize::new(0),
        })
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolResolver for StubResolver {
    async fn resolve(&self, params: &ServerConfig) -> Result<ToolSession, ToolResolutionError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(ToolResolutionError::Unreachable {
                server: params.name.clone(),
                source: ToolInvokeError::Terminated {
                    server: params.name.clone(),
                },
            });
        }
        let connection: Arc<dyn ToolConnection> = self.connection.clone();
        Ok(ToolSession::new(connection, self.tools.clone()))
    }
}

pub fn settings(max_turns: usize) -> RunSettings {
    RunSettings {
        agent: AgentConfig {
            max_turns,
            ..AgentConfig::default()
        },
        tool_server: ServerConfig::default(),
    }
}

pub fn orchestrator(
    max_turns: usize,
    provider: Arc<ScriptedProvider>,
    resolver: Arc<StubResolver>,
) -> TaskOrchestrator {
    TaskOrchestrator::new(settings(max_turns), provider, resolver)
}
