use super::error::ToolInvokeError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Tool metadata as advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerToolInfo {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

/// A live connection to one tool server, scoped to a single run.
#[async_trait]
pub trait ToolConnection: Send + Sync {
    fn server_name(&self) -> &str;

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError>;

    /// Free-form guidance returned by the server during the handshake.
    async fn instructions(&self) -> Option<String>;

    /// Releases the connection. Safe to call more than once.
    async fn close(&self);
}

/// A callable tool bound to the connection it was discovered on.
#[derive(Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    #[serde(skip_serializing)]
    handle: Arc<dyn ToolConnection>,
}

impl ToolDescriptor {
    pub fn new(info: ServerToolInfo, handle: Arc<dyn ToolConnection>) -> Self {
        Self {
            name: info.name,
            description: info.description,
            input_schema: info.input_schema,
            handle,
        }
    }

    pub fn server_name(&self) -> &str {
        self.handle.server_name()
    }

    pub async fn invoke(&self, arguments: Value) -> Result<Value, ToolInvokeError> {
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        self.handle.call_tool(&self.name, arguments).await
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("server", &self.handle.server_name())
            .finish_non_exhaustive()
    }
}
