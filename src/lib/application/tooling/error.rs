use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("failed to spawn MCP server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("MCP server '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("MCP server '{server}' returned invalid JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("MCP server '{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("MCP server '{server}' did not answer '{method}' within {after:?}")]
    Timeout {
        server: String,
        method: String,
        after: Duration,
    },
    #[error("MCP server '{server}' sent an invalid initialize result: {message}")]
    Handshake { server: String, message: String },
    #[error("MCP server '{server}' returned a malformed tool list: {reason}")]
    MalformedToolList { server: String, reason: String },
    #[error("MCP server '{server}' terminated unexpectedly")]
    Terminated { server: String },
    #[error("MCP server '{server}' request cancelled")]
    Cancelled { server: String },
}

/// Failure to obtain a usable tool set before a run starts.
#[derive(Debug, Error)]
pub enum ToolResolutionError {
    #[error("tool server '{server}' is unreachable: {source}")]
    Unreachable {
        server: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error("tool server '{server}' rejected the handshake: {source}")]
    HandshakeRejected {
        server: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error("tool server '{server}' returned a malformed tool list: {reason}")]
    MalformedDescriptors { server: String, reason: String },
}

impl ToolResolutionError {
    /// Classify a transport-level failure raised while connecting.
    pub fn from_invoke(server: impl Into<String>, source: ToolInvokeError) -> Self {
        let server = server.into();
        match source {
            ToolInvokeError::MalformedToolList { reason, .. } => {
                Self::MalformedDescriptors { server, reason }
            }
            ToolInvokeError::Rpc { .. }
            | ToolInvokeError::Timeout { .. }
            | ToolInvokeError::Handshake { .. }
            | ToolInvokeError::InvalidJson { .. } => Self::HandshakeRejected { server, source },
            ToolInvokeError::Spawn { .. }
            | ToolInvokeError::Transport { .. }
            | ToolInvokeError::Terminated { .. }
            | ToolInvokeError::Cancelled { .. } => Self::Unreachable { server, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_connect_failures() {
        let spawn = ToolInvokeError::Spawn {
            server: "notion".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "npx"),
        };
        assert!(matches!(
            ToolResolutionError::from_invoke("notion", spawn),
            ToolResolutionError::Unreachable { .. }
        ));

        let timeout = ToolInvokeError::Timeout {
            server: "notion".into(),
            method: "initialize".into(),
            after: Duration::from_secs(20),
        };
        assert!(matches!(
            ToolResolutionError::from_invoke("notion", timeout),
            ToolResolutionError::HandshakeRejected { .. }
        ));

        let malformed = ToolInvokeError::MalformedToolList {
            server: "notion".into(),
            reason: "tool #0 has no name".into(),
        };
        match ToolResolutionError::from_invoke("notion", malformed) {
            ToolResolutionError::MalformedDescriptors { reason, .. } => {
                assert_eq!(reason, "tool #0 has no name")
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }
}
