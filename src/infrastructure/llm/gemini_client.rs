use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{ChatClient, ChatClientError};
use crate::domain::{ChatTurn, MessageRole};

use super::system_prompt::render_system_prompt;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    options: GenerationOptions,
    system_prompt_template: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        options: GenerationOptions,
        system_prompt_template: String,
        timeout: Duration,
    ) -> Result<Self, ChatClientError> {
        if api_key.trim().is_empty() {
            return Err(ChatClientError::MissingApiKey);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatClientError::ApiRequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model,
            options,
            system_prompt_template,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, prior: &[ChatTurn], message: &str, context: &str) -> GenerateContentRequest {
        let mut contents: Vec<Content> = prior
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    MessageRole::User => "user",
                    MessageRole::Model => "model",
                };
                Content::text(role, &turn.text)
            })
            .collect();
        contents.push(Content::text("user", message));

        let GenerationOptions {
            temperature,
            top_k,
            top_p,
            max_output_tokens,
        } = self.options.clone();
        let generation_config = (temperature.is_some()
            || top_k.is_some()
            || top_p.is_some()
            || max_output_tokens.is_some())
        .then_some(GenerationConfig {
            temperature,
            top_k,
            top_p,
            max_output_tokens,
        });

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: render_system_prompt(&self.system_prompt_template, context),
                }],
            },
            contents,
            generation_config,
        }
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    #[tracing::instrument(skip_all, fields(model = %self.model, prior_turns = prior.len()))]
    async fn converse(
        &self,
        prior: &[ChatTurn],
        message: &str,
        context: &str,
    ) -> Result<String, ChatClientError> {
        let request_body = self.build_request(prior, message, context);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
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

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ChatClientError::InvalidResponse(e.to_string()))?;

        // A blocked or empty candidate yields an empty reply; the session
        // substitutes its fallback text.
        let text = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }
}
