//! Chat-completion request, reply and error types shared by every provider.

use crate::domain::ChatMessage;
use thiserror::Error;

/// One chat-completion call: the full replayed context for a single turn.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }
}

/// Why the provider stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Other(String),
}

impl FinishReason {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            "tool_calls" | "function_call" => Self::ToolCalls,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ContentFilter => "content_filter",
            Self::ToolCalls => "tool_calls",
            Self::Other(raw) => raw,
        }
    }
}

/// The assistant reply for one turn.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
    pub finish_reason: Option<FinishReason>,
}

impl ModelResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message: ChatMessage::assistant(content),
            finish_reason: None,
        }
    }

    /// Builds a reply from one completion choice. Missing or blank text is an
    /// error carrying the provider's finish reason, since an empty reply
    /// cannot hold an action.
    pub fn from_completion(
        provider: &str,
        content: Option<String>,
        finish_reason: Option<&str>,
    ) -> Result<Self, ModelError> {
        let finish_reason = finish_reason.map(FinishReason::parse);
        match content {
            Some(text) if !text.trim().is_empty() => Ok(Self {
                message: ChatMessage::assistant(text),
                finish_reason,
            }),
            _ => Err(ModelError::EmptyReply {
                provider: provider.to_string(),
                finish_reason: finish_reason
                    .as_ref()
                    .map_or("unspecified", FinishReason::as_str)
                    .to_string(),
            }),
        }
    }

    pub fn content(&self) -> &str {
        &self.message.content
    }

    /// The provider hit its token limit, so the reply may be cut mid-JSON.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == Some(FinishReason::Length)
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider type '{provider_type}' is not supported")]
    UnsupportedProvider { provider_type: String },
    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("provider '{provider}' returned no reply text (finish reason: {finish_reason})")]
    EmptyReply {
        provider: String,
        finish_reason: String,
    },
}

impl ModelError {
    pub fn unsupported_provider(provider_type: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider_type: provider_type.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_completion_reports_the_finish_reason() {
        let err = ModelResponse::from_completion("openai", Some("  \n".into()), Some("content_filter"))
            .expect_err("blank reply");
        assert_eq!(
            err.to_string(),
            "provider 'openai' returned no reply text (finish reason: content_filter)"
        );

        let err = ModelResponse::from_completion("openai", None, None).expect_err("missing reply");
        assert!(err.to_string().ends_with("(finish reason: unspecified)"));
    }

    #[test]
    fn length_cutoff_marks_the_reply_truncated() {
        let response = ModelResponse::from_completion(
            "openai",
            Some(r#"{"action":"final","respo"#.into()),
            Some("length"),
        )
        .expect("non-empty reply");
        assert!(response.is_truncated());
        assert_eq!(response.content(), r#"{"action":"final","respo"#);

        assert!(!ModelResponse::new("done").is_truncated());
        assert_eq!(FinishReason::parse("eos"), FinishReason::Other("eos".into()));
    }
}
