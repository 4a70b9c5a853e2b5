use crate::domain::{ChatTurn, Corpus, Message, Transcript};

pub const NO_DOCUMENT_CONTEXT: &str = "No PDF document loaded.";
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I encountered an error communicating with the AI. Please try again.";
pub const EMPTY_REPLY_MESSAGE: &str = "I couldn't generate a response.";

/// Everything the chat client needs for one send, captured while the
/// session lock is held.
#[derive(Debug, Clone)]
pub struct PendingSend {
    epoch: u64,
    pub prior: Vec<ChatTurn>,
    pub message: String,
    pub context: String,
}

impl PendingSend {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendRejected {
    #[error("message is empty")]
    Empty,
    #[error("a message is already being answered")]
    InFlight,
}

/// Transcript plus the single-flight bookkeeping around it. Every reset
/// starts a new epoch; replies addressed to an older epoch are dropped.
#[derive(Debug, Clone)]
pub struct ChatSession {
    transcript: Transcript,
    epoch: u64,
    in_flight: Option<u64>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::welcome(),
            epoch: 0,
            in_flight: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn reset(&mut self, transcript: Transcript) {
        self.transcript = transcript;
        self.epoch += 1;
        self.in_flight = None;
    }

    pub fn clear(&mut self) {
        self.reset(Transcript::cleared());
    }

    /// Appends the user's message and marks the transcript busy.
    pub fn begin_send(&mut self, text: &str, corpus: &Corpus) -> Result<PendingSend, SendRejected> {
        if text.trim().is_empty() {
            return Err(SendRejected::Empty);
        }
        if self.in_flight.is_some() {
            return Err(SendRejected::InFlight);
        }

        let prior = self.transcript.turns();
        self.transcript.push(Message::user(text));
        self.in_flight = Some(self.epoch);

        let context = if corpus.is_empty() {
            NO_DOCUMENT_CONTEXT.to_string()
        } else {
            corpus.text().to_string()
        };

        Ok(PendingSend {
            epoch: self.epoch,
            prior,
            message: text.to_string(),
            context,
        })
    }

    /// Records the outcome of a send. Returns `false` when the transcript
    /// was reset while the request was outstanding.
    pub fn complete_send<E: std::fmt::Display>(
        &mut self,
        pending: &PendingSend,
        reply: Result<String, E>,
    ) -> bool {
        if pending.epoch != self.epoch {
            return false;
        }
        self.in_flight = None;

        let text = match reply {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY_MESSAGE.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Chat client call failed");
                APOLOGY_MESSAGE.to_string()
            }
        };
        self.transcript.push(Message::model(text));
        true
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
