use crate::application::tooling::ToolDescriptor;

pub(super) const TOOL_RESULT_INSTRUCTION: &str = "Use this tool result to continue the task. Call another tool if more information is needed, otherwise give the final answer.";

pub(super) const TOOL_FAILURE_INSTRUCTION: &str = "The previous step failed. Retry with different input, try another tool, or give the final answer explaining what went wrong.";

pub(super) const JSON_RETRY_MESSAGE: &str = "Your previous reply could not be parsed. Answer again with exactly one JSON object using the call_tool or final action.";

/// Appends the action protocol and the tool catalogue to the domain prompt.
pub(super) fn compose_system_instructions(
    system_prompt: &str,
    tools: &[ToolDescriptor],
    server_guidance: Option<&str>,
) -> String {
    let mut lines = vec![
        system_prompt.trim().to_string(),
        "Prefer calling a matching tool over answering from memory.".to_string(),
        "When you need to invoke a tool, respond only with: {\"action\":\"call_tool\",\"tool\":\"tool_name\",\"input\":{...}}."
            .to_string(),
        "To obtain the list of available tools, call the special tool: {\"action\":\"call_tool\",\"tool\":\"list_tools\"}."
            .to_string(),
        "When you are ready to give the final answer, respond with: {\"action\":\"final\",\"response\":\"...\"}."
            .to_string(),
    ];

    if let Some(guidance) = server_guidance.map(str::trim).filter(|g| !g.is_empty()) {
        lines.push(format!("Tool server guidance: {guidance}"));
    }

    if tools.is_empty() {
        lines.push("No tools are currently available.".to_string());
        return lines.join("\n");
    }

    lines.push("Available tools:".to_string());
    for descriptor in tools {
        let mut line = format!("- {}", descriptor.name);
        if let Some(description) = &descriptor.description {
            line.push_str(&format!(": {description}"));
        }
        if let Some(schema) = &descriptor.input_schema {
            let compact = serde_json::to_string(schema).unwrap_or_default();
            line.push_str(&format!(". Input schema: {compact}"));
        }
        lines.push(line);
    }

    lines.join("\n")
}
