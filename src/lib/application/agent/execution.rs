use super::errors::ToolError;
use crate::application::tooling::ToolDescriptor;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub(super) const LIST_TOOLS: &str = "list_tools";

/// Result of one tool invocation as reported back into the conversation.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ToolExecution {
    pub tool: String,
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub output: Value,
}

impl ToolExecution {
    /// JSON text stored as the content of a tool-result message.
    pub(crate) fn to_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"tool\":\"{}\"}}", self.tool))
    }
}

pub(super) async fn execute(
    tools: &[ToolDescriptor],
    tool_name: &str,
    input: Value,
) -> Result<ToolExecution, ToolError> {
    if tool_name.eq_ignore_ascii_case(LIST_TOOLS) {
        debug!("Agent requested tool catalogue via list_tools");
        let output = json!({ "tools": tools });
        return Ok(ToolExecution {
            tool: LIST_TOOLS.to_string(),
            input,
            message: Some(format!("{} tools available.", tools.len())),
            output,
        });
    }

    let Some(tool) = tools
        .iter()
        .find(|tool| tool.name.eq_ignore_ascii_case(tool_name))
    else {
        warn!(requested_tool = %tool_name, "Unknown tool requested by agent");
        return Err(ToolError::UnknownTool(tool_name.to_string()));
    };

    debug!(tool = %tool.name, server = tool.server_name(), "Dispatching tool via MCP");
    match tool.invoke(input.clone()).await {
        Ok(result) => {
            let message = extract_tool_message(&result);
            if reports_failure(&result) {
                let message =
                    message.unwrap_or_else(|| "tool returned no failure details".to_string());
                warn!(tool = %tool.name, %message, "Tool reported a failure");
                return Err(ToolError::Reported {
                    tool: tool.name.clone(),
                    message,
                });
            }
            info!(tool = %tool.name, "Tool executed");
            Ok(ToolExecution {
                tool: tool.name.clone(),
                input,
                message,
                output: result_payload(result),
            })
        }
        Err(source) => {
            warn!(tool = %tool.name, %source, "Tool execution failed");
            Err(ToolError::Execution {
                tool: tool.name.clone(),
                source,
            })
        }
    }
}

fn reports_failure(result: &Value) -> bool {
    result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// `structuredContent` when the server sent one, else the `content` blocks.
/// Results without either are passed through whole.
fn result_payload(result: Value) -> Value {
    match result {
        Value::Object(mut map) => map
            .remove("structuredContent")
            .or_else(|| map.remove("content"))
            .unwrap_or(Value::Object(map)),
        other => other,
    }
}

fn extract_tool_message(result: &Value) -> Option<String> {
    if let Some(array) = result.get("content").and_then(Value::as_array) {
        for block in array {
            let is_text = block
                .get("type")
                .and_then(Value::as_str)
                .map(|value| value.eq_ignore_ascii_case("text"))
                .unwrap_or(false);
            if !is_text {
                continue;
            }
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    result
        .pointer("/structuredContent/error/message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
