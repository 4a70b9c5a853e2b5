use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use lectern::application::ports::{ChatClient, ChatClientError};
use lectern::domain::ChatTurn;

use super::gate::Gate;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prior: Vec<ChatTurn>,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Echo,
    Text(String),
    Fail,
}

pub struct MockChatClient {
    reply: Reply,
    gate: Mutex<Option<Arc<Gate>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockChatClient {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(Reply::Echo)
    }

    pub fn failing() -> Self {
        Self::new(Reply::Fail)
    }

    /// The next call parks until the returned gate opens.
    pub fn hold_next(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn converse(
        &self,
        prior: &[ChatTurn],
        message: &str,
        context: &str,
    ) -> Result<String, ChatClientError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prior: prior.to_vec(),
            message: message.to_string(),
            context: context.to_string(),
        });

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }

        match &self.reply {
            Reply::Echo => Ok(format!("You said: {message}")),
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(ChatClientError::ApiRequestFailed(
                "mock upstream failure".to_string(),
            )),
        }
    }
}
