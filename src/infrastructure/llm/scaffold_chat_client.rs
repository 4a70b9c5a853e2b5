use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ChatClient, ChatClientError};
use crate::domain::ChatTurn;

/// Canned replies for running without a model provider.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldChatClient {
    delay: Duration,
}

impl ScaffoldChatClient {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ChatClient for ScaffoldChatClient {
    async fn converse(
        &self,
        prior: &[ChatTurn],
        message: &str,
        context: &str,
    ) -> Result<String, ChatClientError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(format!(
            "Scaffold reply to \"{}\" ({} earlier messages, {} characters of document context).",
            message,
            prior.len(),
            context.chars().count()
        ))
    }
}
