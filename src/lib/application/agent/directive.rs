//! Parsing of the JSON action protocol the assistant answers with.

use serde_json::Value;

#[derive(Debug, PartialEq)]
pub enum AgentDirective {
    Final { response: String },
    CallTool { tool: String, input: Value },
}

/// Interprets one model reply.
///
/// Replies without any JSON object are taken as a plain final answer. A reply
/// that carries JSON but not a valid action is an error, so the caller can ask
/// the model to correct itself.
pub fn parse_agent_action(content: &str) -> Result<AgentDirective, String> {
    match extract_json(content) {
        Some(value) => parse_action_value(value),
        None if looks_like_json(content) => Err("expected JSON object in agent response".into()),
        None => Ok(AgentDirective::Final {
            response: content.trim().to_string(),
        }),
    }
}

fn parse_action_value(value: Value) -> Result<AgentDirective, String> {
    match value {
        Value::Object(map) => {
            let action = map
                .get("action")
                .and_then(Value::as_str)
                .ok_or_else(|| "missing action field in agent response".to_string())?;
            match action {
                "call_tool" => {
                    let tool = map
                        .get("tool")
                        .and_then(Value::as_str)
                        .filter(|tool| !tool.trim().is_empty())
                        .ok_or_else(|| "call_tool action missing tool field".to_string())?;
                    let input = map.get("input").cloned().unwrap_or(Value::Null);
                    Ok(AgentDirective::CallTool {
                        tool: tool.trim().to_string(),
                        input,
                    })
                }
                "final" => {
                    let response = map
                        .get("response")
                        .and_then(Value::as_str)
                        .ok_or_else(|| "final action missing response field".to_string())?;
                    Ok(AgentDirective::Final {
                        response: response.to_string(),
                    })
                }
                other => Err(format!("unknown action value: {other}")),
            }
        }
        Value::String(text) => parse_agent_action(&text),
        other => Err(format!("unsupported response type: {other}")),
    }
}

fn looks_like_json(content: &str) -> bool {
    let trimmed = content.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with("```")
}

fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() || value.is_string() {
            return Some(value);
        }
    }

    if trimmed.starts_with("```") {
        let stripped = trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```JSON")
            .trim_start_matches("```");
        if let Some(end) = stripped.rfind("```") {
            if let Ok(value) = serde_json::from_str::<Value>(stripped[..end].trim()) {
                return Some(value);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return Some(value);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tool_call_with_input() {
        let directive = parse_agent_action(
            r#"{"action":"call_tool","tool":"notion-search","input":{"query":"pages"}}"#,
        )
        .expect("valid directive");
        assert_eq!(
            directive,
            AgentDirective::CallTool {
                tool: "notion-search".into(),
                input: json!({"query": "pages"}),
            }
        );
    }

    #[test]
    fn parses_fenced_and_embedded_json() {
        let fenced = "```json\n{\"action\":\"final\",\"response\":\"done TERMINATE\"}\n```";
        assert_eq!(
            parse_agent_action(fenced),
            Ok(AgentDirective::Final {
                response: "done TERMINATE".into()
            })
        );

        let embedded = "Sure! {\"action\":\"final\",\"response\":\"ok\"} hope that helps";
        assert_eq!(
            parse_agent_action(embedded),
            Ok(AgentDirective::Final {
                response: "ok".into()
            })
        );
    }

    #[test]
    fn plain_text_is_a_final_answer() {
        assert_eq!(
            parse_agent_action("  You have 3 pages. TERMINATE \n"),
            Ok(AgentDirective::Final {
                response: "You have 3 pages. TERMINATE".into()
            })
        );
    }

    #[test]
    fn broken_json_and_unknown_actions_are_errors() {
        assert!(parse_agent_action("{\"action\": \"call_tool\", ").is_err());
        assert!(parse_agent_action(r#"{"action":"dance"}"#).is_err());
        assert!(parse_agent_action(r#"{"action":"call_tool"}"#).is_err());
        assert!(parse_agent_action(r#"{"response":"missing action"}"#).is_err());
    }
}
