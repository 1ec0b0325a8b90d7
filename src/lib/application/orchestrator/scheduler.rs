use super::termination::TerminationCondition;
use crate::application::agent::{ConfigurationError, Participant};
use crate::domain::{Message, MessageKind, StopReason, Task};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Progress of one conversation.
///
/// `terminated` and `turns_exhausted` are never both set and `turn_index`
/// never exceeds the turn limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnState {
    pub turn_index: usize,
    pub terminated: bool,
    pub turns_exhausted: bool,
}

impl TurnState {
    /// Records a finished turn. Termination is checked before the limit.
    fn advance(&mut self, signaled: bool, max_turns: usize) {
        self.turn_index += 1;
        if signaled {
            self.terminated = true;
        } else if self.turn_index >= max_turns {
            self.turns_exhausted = true;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.terminated || self.turns_exhausted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub stop_reason: StopReason,
    pub turns: usize,
}

/// Hands turns to participants in fixed rotation until the termination
/// condition fires or the turn limit is reached.
pub struct RoundRobinScheduler {
    participants: Vec<Arc<dyn Participant>>,
    max_turns: usize,
    termination: Box<dyn TerminationCondition>,
}

impl RoundRobinScheduler {
    pub fn new(
        participants: Vec<Arc<dyn Participant>>,
        max_turns: usize,
        termination: impl TerminationCondition + 'static,
    ) -> Result<Self, ConfigurationError> {
        if participants.is_empty() {
            return Err(ConfigurationError::NoParticipants);
        }
        if max_turns == 0 {
            return Err(ConfigurationError::ZeroTurns);
        }
        Ok(Self {
            participants,
            max_turns,
            termination: Box::new(termination),
        })
    }

    /// Drives the conversation, pushing every message into `sink` as soon as
    /// it exists. The task itself goes out first as ordinal 0.
    ///
    /// Dropping `sink` on return is what closes the stream for the consumer.
    pub async fn run(&self, task: &Task, sink: mpsc::Sender<Message>) -> ScheduleSummary {
        let mut state = TurnState::default();
        let mut thread = Vec::with_capacity(self.max_turns + 1);

        let opening = Message::task(task);
        thread.push(opening.clone());
        if sink.send(opening).await.is_err() {
            warn!("Transcript stream closed before the first turn");
            return ScheduleSummary {
                stop_reason: StopReason::StreamClosed,
                turns: 0,
            };
        }

        loop {
            let participant = &self.participants[state.turn_index % self.participants.len()];
            let ordinal = state.turn_index as u64 + 1;
            debug!(
                turn = ordinal,
                participant = participant.name(),
                "Starting turn"
            );

            let message = match participant.take_turn(&thread).await {
                Ok(reply) => Message {
                    ordinal,
                    source: participant.name().to_string(),
                    kind: reply.kind,
                    content: reply.content,
                },
                Err(err) => {
                    warn!(
                        turn = ordinal,
                        participant = participant.name(),
                        error = %err,
                        "Turn failed, recording it and continuing"
                    );
                    Message {
                        ordinal,
                        source: participant.name().to_string(),
                        kind: MessageKind::Error,
                        content: format!("Error: {err}"),
                    }
                }
            };

            let signaled = self.termination.is_met(&message);
            state.advance(signaled, self.max_turns);
            thread.push(message.clone());

            if sink.send(message).await.is_err() {
                warn!(turn = ordinal, "Transcript stream closed, stopping run");
                return ScheduleSummary {
                    stop_reason: StopReason::StreamClosed,
                    turns: state.turn_index,
                };
            }

            if state.is_finished() {
                let stop_reason = if state.terminated {
                    StopReason::TerminationSignaled
                } else {
                    StopReason::TurnLimitReached
                };
                info!(turns = state.turn_index, ?stop_reason, "Conversation finished");
                return ScheduleSummary {
                    stop_reason,
                    turns: state.turn_index,
                };
            }
        }
    }
}
