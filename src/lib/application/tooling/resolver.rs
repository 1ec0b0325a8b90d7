use super::error::ToolResolutionError;
use super::interface::{ServerToolInfo, ToolConnection, ToolDescriptor};
use super::process::McpProcess;
use crate::config::ServerConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Connects to a tool server and discovers its tools for one run.
#[async_trait]
pub trait ToolResolver: Send + Sync {
    async fn resolve(&self, params: &ServerConfig) -> Result<ToolSession, ToolResolutionError>;
}

/// The connection and tool set belonging to a single run.
///
/// Call [`ToolSession::close`] when the run ends. A session dropped without
/// closing, for example by a cancelled run, closes its connection on a
/// background task.
pub struct ToolSession {
    connection: Arc<dyn ToolConnection>,
    tools: Vec<ToolDescriptor>,
    closed: bool,
}

impl ToolSession {
    pub fn new(connection: Arc<dyn ToolConnection>, tools: Vec<ServerToolInfo>) -> Self {
        let tools = tools
            .into_iter()
            .map(|info| ToolDescriptor::new(info, Arc::clone(&connection)))
            .collect();
        Self {
            connection,
            tools,
            closed: false,
        }
    }

    pub fn server_name(&self) -> &str {
        self.connection.server_name()
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub async fn instructions(&self) -> Option<String> {
        self.connection.instructions().await
    }

    pub async fn close(mut self) {
        debug!(server = self.connection.server_name(), "Closing tool session");
        self.connection.close().await;
        self.closed = true;
    }
}

impl Drop for ToolSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!(
                server = self.connection.server_name(),
                "Tool session dropped outside a runtime, relying on kill_on_drop"
            );
            return;
        };
        debug!(
            server = self.connection.server_name(),
            "Tool session dropped without close, closing in background"
        );
        let connection = Arc::clone(&self.connection);
        runtime.spawn(async move {
            connection.close().await;
        });
    }
}

/// Spawns a fresh MCP server process per resolution; nothing is shared
/// between runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct McpToolResolver;

#[async_trait]
impl ToolResolver for McpToolResolver {
    async fn resolve(&self, params: &ServerConfig) -> Result<ToolSession, ToolResolutionError> {
        let process = McpProcess::new(params.clone());
        if let Err(source) = process.start().await {
            process.shutdown().await;
            return Err(ToolResolutionError::from_invoke(&params.name, source));
        }

        let tools = process.tools().await;
        info!(
            server = %params.name,
            tools = tools.len(),
            "Resolved tools from MCP server"
        );
        Ok(ToolSession::new(Arc::new(process), tools))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tooling::ToolInvokeError;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingConnection {
        closed: AtomicUsize,
    }

    #[async_trait]
    impl ToolConnection for CountingConnection {
        fn server_name(&self) -> &str {
            "stub"
        }

        async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
            Ok(json!({ "tool": tool, "arguments": arguments }))
        }

        async fn instructions(&self) -> Option<String> {
            Some("use search first".into())
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn descriptors_are_bound_to_the_session_connection() {
        let connection = Arc::new(CountingConnection::default());
        let session = ToolSession::new(
            connection.clone(),
            vec![ServerToolInfo {
                name: "notion-search".into(),
                description: None,
                input_schema: None,
            }],
        );

        assert_eq!(session.server_name(), "stub");
        assert_eq!(session.instructions().await.as_deref(), Some("use search first"));
        let output = session.tools()[0]
            .invoke(Value::Null)
            .await
            .expect("stub call succeeds");
        assert_eq!(output["tool"], "notion-search");
        assert_eq!(output["arguments"], json!({}));

        session.close().await;
        assert_eq!(connection.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_session_closes_in_background() {
        let connection = Arc::new(CountingConnection::default());
        let session = ToolSession::new(connection.clone(), Vec::new());

        drop(session);
        for _ in 0..10 {
            if connection.closed.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(connection.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_server_fails_resolution() {
        let params = ServerConfig {
            name: "ghost".into(),
            command: PathBuf::from("/nonexistent/ghost-mcp"),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
            read_timeout: Duration::from_secs(1),
        };

        let err = match McpToolResolver.resolve(&params).await {
            Err(err) => err,
            Ok(_) => panic!("resolution must fail"),
        };

        assert!(matches!(err, ToolResolutionError::Unreachable { .. }));
        assert!(err.to_string().contains("ghost"));
    }
}
