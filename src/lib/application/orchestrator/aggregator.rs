use crate::domain::Message;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

pub const MESSAGE_SEPARATOR: &str = "\n\n\n";

/// Finalized record of a run. Only obtainable by consuming an aggregator or
/// from an already complete list of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
    text: String,
}

impl Transcript {
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let text = messages
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(MESSAGE_SEPARATOR);
        Self { messages, text }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Collects messages in arrival order. Nothing is dropped, merged or
/// reordered.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    messages: Vec<Message>,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        debug!(ordinal = message.ordinal, kind = %message.kind.as_str(), "Transcript message received");
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Reads until every sender is gone, then finalizes.
    pub async fn drain(mut self, receiver: mpsc::Receiver<Message>) -> Transcript {
        let mut stream = ReceiverStream::new(receiver);
        while let Some(message) = stream.next().await {
            self.push(message);
        }
        self.finish()
    }

    pub fn finish(self) -> Transcript {
        Transcript::from_messages(self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageKind;

    fn message(ordinal: u64, content: &str) -> Message {
        Message {
            ordinal,
            source: "notion_agent".into(),
            kind: MessageKind::Text,
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn drains_in_arrival_order() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(message(1, "first")).await.expect("send");
        tx.send(message(2, "second")).await.expect("send");
        tx.send(message(3, "first")).await.expect("send");
        drop(tx);

        let transcript = StreamAggregator::new().drain(rx).await;

        assert_eq!(transcript.messages().len(), 3);
        assert_eq!(
            transcript.text(),
            "notion_agent (text): first\n\n\nnotion_agent (text): second\n\n\nnotion_agent (text): first"
        );
    }

    #[test]
    fn rejoining_is_idempotent() {
        let transcript = Transcript::from_messages(vec![message(1, "a"), message(2, "b")]);
        let again = Transcript::from_messages(transcript.messages().to_vec());
        assert_eq!(transcript, again);

        let parts: Vec<&str> = transcript.text().split(MESSAGE_SEPARATOR).collect();
        assert_eq!(parts.join(MESSAGE_SEPARATOR), transcript.text());
    }

    #[test]
    fn empty_aggregator_finishes_with_empty_text() {
        let aggregator = StreamAggregator::new();
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.finish().text(), "");
    }
}
