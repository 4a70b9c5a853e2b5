use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{ChatClient, ChatClientError};
use crate::domain::{ChatTurn, MessageRole};

use super::system_prompt::render_system_prompt;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    system_prompt_template: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: Option<&str>,
        api_key: String,
        model: String,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        system_prompt_template: String,
        timeout: Duration,
    ) -> Result<Self, ChatClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatClientError::ApiRequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or(OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model,
            max_tokens,
            temperature,
            system_prompt_template,
        })
    }

    fn build_messages(&self, prior: &[ChatTurn], message: &str, context: &str) -> Vec<ChatMessage> {
        let system = ChatMessage {
            role: "system".to_string(),
            content: Some(render_system_prompt(&self.system_prompt_template, context)),
        };
        let history = prior.iter().map(|turn| ChatMessage {
            role: match turn.role {
                MessageRole::User => "user".to_string(),
                MessageRole::Model => "assistant".to_string(),
            },
            content: Some(turn.text.clone()),
        });
        let user = ChatMessage {
            role: "user".to_string(),
            content: Some(message.to_string()),
        };

        std::iter::once(system)
            .chain(history)
            .chain(std::iter::once(user))
            .collect()
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    #[tracing::instrument(skip_all, fields(model = %self.model, prior_turns = prior.len()))]
    async fn converse(
        &self,
        prior: &[ChatTurn],
        message: &str,
        context: &str,
    ) -> Result<String, ChatClientError> {
        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: self.build_messages(prior, message, context),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ChatClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ChatClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatClientError::InvalidResponse(e.to_string()))?;

        completion_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| ChatClientError::InvalidResponse("empty choices".to_string()))
    }
}
