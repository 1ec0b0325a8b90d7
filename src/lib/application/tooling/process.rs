use super::error::ToolInvokeError;
use super::interface::{ServerToolInfo, ToolConnection};
use crate::config::ServerConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value, json};
use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2025-06-18";

/// Guard against servers that keep handing out cursors.
const MAX_TOOL_PAGES: usize = 64;

type PendingMap = HashMap<String, oneshot::Sender<Result<Value, ToolInvokeError>>>;

/// An MCP server child process spoken to with newline-delimited JSON-RPC.
///
/// The child is spawned with `kill_on_drop` and only handles own the
/// process state; background tasks hold weak or short-lived references. So
/// dropping the last handle without calling [`McpProcess::shutdown`] still
/// kills the child.
#[derive(Clone)]
pub struct McpProcess {
    inner: Arc<McpProcessInner>,
}

struct McpProcessInner {
    server: ServerConfig,
    state: AsyncMutex<Option<RunningState>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: AsyncMutex<PendingMap>,
    id_counter: AtomicU64,
    instructions: AsyncMutex<Option<String>>,
    tools: AsyncMutex<Vec<ServerToolInfo>>,
}

struct RunningState {
    child: Child,
}

impl McpProcess {
    pub fn new(server: ServerConfig) -> Self {
        Self {
            inner: Arc::new(McpProcessInner {
                server,
                state: AsyncMutex::new(None),
                writer: AsyncMutex::new(None),
                pending: AsyncMutex::new(HashMap::new()),
                id_counter: AtomicU64::new(1),
                instructions: AsyncMutex::new(None),
                tools: AsyncMutex::new(Vec::new()),
            }),
        }
    }

    /// Spawns the server and completes the `initialize` / `tools/list`
    /// handshake. A no-op when already running.
    pub async fn start(&self) -> Result<(), ToolInvokeError> {
        self.inner.start().await
    }

    /// Tool catalogue from the most recent `tools/list`, in server order.
    pub async fn tools(&self) -> Vec<ServerToolInfo> {
        self.inner.tools.lock().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.inner.state.lock().await.is_some()
    }

    pub async fn shutdown(&self) {
        self.inner.reset().await;
    }
}

#[async_trait]
impl ToolConnection for McpProcess {
    fn server_name(&self) -> &str {
        &self.inner.server.name
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        self.inner.call_tool(tool, arguments).await
    }

    async fn instructions(&self) -> Option<String> {
        self.inner.instructions.lock().await.clone()
    }

    async fn close(&self) {
        self.shutdown().await;
    }
}

impl McpProcessInner {
    async fn start(self: &Arc<Self>) -> Result<(), ToolInvokeError> {
        {
            let state = self.state.lock().await;
            if state.is_some() {
                return Ok(());
            }
        }

        let mut command = Command::new(&self.server.command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.server.workdir {
            command.current_dir(dir);
        }
        if !self.server.args.is_empty() {
            command.args(&self.server.args);
        }
        for (key, value) in &self.server.env {
            command.env(key, value);
        }

        debug!(
            server = %self.server.name,
            command = %self.server.command.display(),
            args = ?self.server.args,
            "Spawning MCP server"
        );
        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: self.server.name.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdout"))?;

        {
            let mut writer = self.writer.lock().await;
            *writer = Some(BufWriter::new(stdin));
        }

        {
            let mut state = self.state.lock().await;
            *state = Some(RunningState { child });
        }

        tokio::spawn(Self::reader_loop(
            Arc::downgrade(self),
            self.server.name.clone(),
            stdout,
        ));

        match self.initialize_sequence().await {
            Ok(_) => Ok(()),
            Err(err) => {
                self.reset().await;
                Err(err)
            }
        }
    }

    async fn initialize_sequence(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "title": "MCP Task Runner"
            },
            "capabilities": {
                "elicitation": {}
            }
        });
        let init_result = self.send_request("initialize", params).await?;
        let negotiated = init_result
            .get("protocolVersion")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolInvokeError::Handshake {
                server: self.server.name.clone(),
                message: "missing protocolVersion".to_string(),
            })?;
        let remote = init_result
            .pointer("/serverInfo/name")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!(
            server = %self.server.name,
            protocol = negotiated,
            remote,
            "MCP handshake completed"
        );
        if let Some(text) = init_result.get("instructions").and_then(Value::as_str) {
            let mut instructions = self.instructions.lock().await;
            *instructions = Some(text.to_string());
        }
        self.send_notification("notifications/initialized", json!({}))
            .await?;

        self.refresh_tools().await
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        if self.state.lock().await.is_none() {
            return Err(ToolInvokeError::Terminated {
                server: self.server.name.clone(),
            });
        }
        let params = json!({
            "name": tool,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        self.send_request("tools/call", params).await
    }

    async fn refresh_tools(&self) -> Result<(), ToolInvokeError> {
        let mut collected = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TOOL_PAGES {
            let params = match &cursor {
                Some(cursor) => json!({ "cursor": cursor }),
                None => json!({}),
            };
            let result = self.send_request("tools/list", params).await?;
            let page = parse_tool_list(&result).map_err(|reason| self.malformed(reason))?;
            collected.extend(page);

            match result.get("nextCursor").and_then(Value::as_str) {
                Some(next) if !next.is_empty() => cursor = Some(next.to_string()),
                _ => {
                    cursor = None;
                    break;
                }
            }
        }
        if cursor.is_some() {
            warn!(
                server = %self.server.name,
                pages = MAX_TOOL_PAGES,
                "Stopped following tools/list cursors"
            );
        }

        ensure_unique_names(&collected).map_err(|reason| self.malformed(reason))?;
        debug!(
            server = %self.server.name,
            tools = collected.len(),
            "Tool catalogue refreshed"
        );
        *self.tools.lock().await = collected;
        Ok(())
    }

    /// Holds only a weak handle between lines, so dropping the last
    /// [`McpProcess`] drops the child and ends the loop at EOF.
    async fn reader_loop(this: Weak<Self>, server: String, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(raw)) = lines.next_line().await {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(inner) = this.upgrade() else {
                break;
            };
            if !trimmed.starts_with('{') {
                debug!(
                    server = %server,
                    line = trimmed,
                    "skipping non-JSON log line from MCP server"
                );
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => {
                    if let Err(err) = inner.process_inbound_message(value).await {
                        warn!(
                            server = %server,
                            %err,
                            "failed to process message from MCP server"
                        );
                    }
                }
                Err(source) => {
                    warn!(
                        server = %server,
                        line = trimmed,
                        %source,
                        "received invalid JSON from MCP server"
                    );
                }
            }
        }

        debug!(server = %server, "MCP server stdout closed");
        if let Some(inner) = this.upgrade() {
            inner.reset().await;
        }
    }

    async fn process_inbound_message(self: &Arc<Self>, value: Value) -> Result<(), ToolInvokeError> {
        if let Some(id) = value.get("id").cloned() {
            if value.get("method").is_some() {
                self.handle_server_request(id, value).await
            } else {
                self.handle_response(id, value).await
            }
        } else if value.get("method").is_some() {
            self.handle_notification(value);
            Ok(())
        } else {
            Ok(())
        }
    }

    async fn handle_response(&self, id: Value, value: Value) -> Result<(), ToolInvokeError> {
        let Some(key) = response_key(&id) else {
            return Ok(());
        };

        let responder = {
            let mut pending = self.pending.lock().await;
            pending.remove(&key)
        };

        let Some(sender) = responder else {
            debug!(
                server = %self.server.name,
                response_id = key,
                "received response for unknown request"
            );
            return Ok(());
        };

        if let Some(error) = value.get("error") {
            let rpc_error = match error.as_object() {
                Some(err) => ToolInvokeError::Rpc {
                    server: self.server.name.clone(),
                    code: err.get("code").and_then(Value::as_i64).unwrap_or(-32000),
                    message: err
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string(),
                },
                None => self.transport_error("missing error payload in response"),
            };
            let _ = sender.send(Err(rpc_error));
        } else {
            let _ = sender.send(Ok(value));
        }
        Ok(())
    }

    async fn handle_server_request(&self, id: Value, value: Value) -> Result<(), ToolInvokeError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        match method {
            "ping" => {
                self.send_response(id, json!({})).await?;
            }
            "elicitation/create" => {
                let params = value.get("params").cloned().unwrap_or(Value::Null);
                let response = build_elicitation_ack(params);
                self.send_response(id, response).await?;
            }
            other => {
                warn!(
                    server = %self.server.name,
                    method = other,
                    "server sent unsupported request"
                );
                let error = json!({
                    "code": -32601,
                    "message": format!("client does not implement method '{other}'"),
                });
                self.send_error(id, error).await?;
            }
        }
        Ok(())
    }

    /// Refreshes run on their own task: the reader loop must stay free to
    /// deliver the `tools/list` response.
    fn handle_notification(self: &Arc<Self>, value: Value) {
        let Some(method) = value.get("method").and_then(Value::as_str) else {
            return;
        };
        debug!(
            server = %self.server.name,
            method,
            "received notification from server"
        );
        if method == "notifications/tools/list_changed" {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(err) = this.refresh_tools().await {
                    warn!(
                        server = %this.server.name,
                        %err,
                        "failed to refresh tool catalogue"
                    );
                }
            });
        }
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id.clone(), tx);
        }

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        if let Err(err) = self.write_message(&payload).await {
            self.pending.lock().await.remove(&id);
            return Err(err);
        }

        let read_timeout = self.server.read_timeout;
        match timeout(read_timeout, rx).await {
            Ok(Ok(Ok(value))) => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
            Ok(Ok(Err(err))) => Err(err),
            Ok(Err(_)) => Err(ToolInvokeError::Cancelled {
                server: self.server.name.clone(),
            }),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                warn!(
                    server = %self.server.name,
                    method,
                    timeout = ?read_timeout,
                    "MCP request timed out"
                );
                Err(ToolInvokeError::Timeout {
                    server: self.server.name.clone(),
                    method: method.to_string(),
                    after: read_timeout,
                })
            }
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        self.write_message(&payload).await
    }

    async fn send_response(&self, id: Value, result: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result
        });
        self.write_message(&payload).await
    }

    async fn send_error(&self, id: Value, error: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": error
        });
        self.write_message(&payload).await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolInvokeError> {
        let mut encoded =
            serde_json::to_string(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.server.name.clone(),
                source,
            })?;
        encoded.push('\n');

        let mut writer = self.writer.lock().await;
        let stream = writer.as_mut().ok_or_else(|| ToolInvokeError::Terminated {
            server: self.server.name.clone(),
        })?;
        stream
            .write_all(encoded.as_bytes())
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        Ok(())
    }

    async fn reset(&self) {
        {
            let mut writer = self.writer.lock().await;
            *writer = None;
        }

        let mut state = self.state.lock().await;
        if let Some(mut running) = state.take() {
            if let Err(err) = running.child.kill().await {
                debug!(
                    server = %self.server.name,
                    %err,
                    "failed to kill MCP server process (may have already exited)"
                );
            }
            let _ = running.child.wait().await;
            info!(server = %self.server.name, "MCP server connection released");
        }
        drop(state);

        self.fail_all_pending().await;
        self.tools.lock().await.clear();
        self.instructions.lock().await.take();
    }

    async fn fail_all_pending(&self) {
        let mut pending = self.pending.lock().await;
        for (_, sender) in pending.drain() {
            let _ = sender.send(Err(ToolInvokeError::Terminated {
                server: self.server.name.clone(),
            }));
        }
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }

    fn malformed(&self, reason: String) -> ToolInvokeError {
        ToolInvokeError::MalformedToolList {
            server: self.server.name.clone(),
            reason,
        }
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.server.name.clone(),
            message: message.into(),
        }
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

/// Parses one `tools/list` page, rejecting entries the agent could not call.
pub(super) fn parse_tool_list(result: &Value) -> Result<Vec<ServerToolInfo>, String> {
    let array = result
        .get("tools")
        .and_then(Value::as_array)
        .ok_or_else(|| "response has no 'tools' array".to_string())?;

    let mut tools = Vec::with_capacity(array.len());
    for (index, tool) in array.iter().enumerate() {
        let name = tool
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| format!("tool #{index} has no name"))?;
        let input_schema = match tool.get("inputSchema") {
            None | Some(Value::Null) => None,
            Some(schema @ Value::Object(_)) => Some(schema.clone()),
            Some(_) => return Err(format!("tool '{name}' has a non-object inputSchema")),
        };
        let description = tool
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        tools.push(ServerToolInfo {
            name: name.to_string(),
            description,
            input_schema,
        });
    }
    Ok(tools)
}

fn ensure_unique_names(tools: &[ServerToolInfo]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for tool in tools {
        if !seen.insert(tool.name.as_str()) {
            return Err(format!("tool '{}' is listed more than once", tool.name));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, Default)]
struct ElicitationCreateParams {
    #[serde(default)]
    message: Option<String>,
}

fn build_elicitation_ack(params: Value) -> Value {
    let parsed: ElicitationCreateParams = serde_json::from_value(params).unwrap_or_default();

    let mut content = JsonMap::new();
    if let Some(message) = parsed.message {
        let trimmed = message.trim();
        if !trimmed.is_empty() {
            content.insert("message".to_string(), Value::String(trimmed.to_string()));
        }
    }

    json!({
        "action": "accept",
        "content": Value::Object(content),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn parses_tool_page_in_server_order() {
        let result = json!({
            "tools": [
                {
                    "name": "notion-search",
                    "description": " Search the workspace ",
                    "inputSchema": {"type": "object"}
                },
                { "name": "notion-fetch" }
            ]
        });

        let tools = parse_tool_list(&result).expect("valid page");

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "notion-search");
        assert_eq!(tools[0].description.as_deref(), Some("Search the workspace"));
        assert_eq!(tools[0].input_schema, Some(json!({"type": "object"})));
        assert_eq!(tools[1].name, "notion-fetch");
        assert!(tools[1].input_schema.is_none());
    }

    #[test]
    fn rejects_malformed_tool_pages() {
        assert!(parse_tool_list(&json!({})).is_err());
        assert!(parse_tool_list(&json!({"tools": [{"description": "no name"}]})).is_err());
        assert!(parse_tool_list(&json!({"tools": [{"name": "  "}]})).is_err());
        let err = parse_tool_list(&json!({"tools": [{"name": "x", "inputSchema": "object"}]}))
            .expect_err("string schema is rejected");
        assert!(err.contains("non-object inputSchema"));
    }

    #[test]
    fn duplicate_tool_names_are_rejected() {
        let tools = parse_tool_list(&json!({"tools": [{"name": "a"}, {"name": "a"}]}))
            .expect("page parses");
        assert!(ensure_unique_names(&tools).is_err());
    }

    #[test]
    fn elicitation_is_accepted_with_trimmed_message() {
        let ack = build_elicitation_ack(json!({"message": "  Confirm page creation  "}));
        assert_eq!(ack["action"], "accept");
        assert_eq!(ack["content"]["message"], "Confirm page creation");

        let empty = build_elicitation_ack(Value::Null);
        assert_eq!(empty["content"], json!({}));
    }

    #[tokio::test]
    async fn spawn_failure_is_reported() {
        let config = ServerConfig {
            name: "missing".into(),
            command: PathBuf::from("/nonexistent/mcp-server-binary"),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
            read_timeout: Duration::from_secs(1),
        };
        let process = McpProcess::new(config);

        let err = process.start().await.expect_err("spawn must fail");

        assert!(matches!(err, ToolInvokeError::Spawn { .. }));
        assert!(!process.is_running().await);
    }

    #[tokio::test]
    async fn calls_fail_when_not_started() {
        let process = McpProcess::new(ServerConfig::default());
        let err = process
            .call_tool("notion-search", Value::Null)
            .await
            .expect_err("not running");
        assert!(matches!(err, ToolInvokeError::Terminated { .. }));
    }
}
