use crate::domain::Message;

/// Predicate evaluated on every emitted turn message.
pub trait TerminationCondition: Send + Sync {
    fn is_met(&self, message: &Message) -> bool;
}

/// Stops the conversation once a message mentions the token.
///
/// Matching is a case-sensitive substring search, so `"terminate"` does not
/// stop a run configured with `"TERMINATE"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMention {
    token: String,
}

impl TextMention {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TerminationCondition for TextMention {
    fn is_met(&self, message: &Message) -> bool {
        !self.token.is_empty() && message.content.contains(&self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageKind;

    fn text(content: &str) -> Message {
        Message {
            ordinal: 1,
            source: "notion_agent".into(),
            kind: MessageKind::Text,
            content: content.into(),
        }
    }

    #[test]
    fn matches_token_anywhere_in_content() {
        let condition = TextMention::new("TERMINATE");
        assert!(condition.is_met(&text("All done. TERMINATE")));
        assert!(condition.is_met(&text("TERMINATED")));
        assert!(!condition.is_met(&text("terminate")));
        assert!(!condition.is_met(&text("still working")));
    }
}
