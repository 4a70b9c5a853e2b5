use async_trait::async_trait;

use crate::domain::ChatTurn;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// `prior` excludes `message`; `context` is never empty.
    async fn converse(
        &self,
        prior: &[ChatTurn],
        message: &str,
        context: &str,
    ) -> Result<String, ChatClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChatClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("missing API key")]
    MissingApiKey,
}
