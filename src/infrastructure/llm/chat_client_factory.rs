use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ChatClient, ChatClientError};
use crate::presentation::config::{ChatProvider, LlmSettings, ScaffoldConfig};

use super::{GeminiClient, GenerationOptions, OpenAiChatClient, ScaffoldChatClient};

#[derive(Debug, thiserror::Error)]
pub enum ChatClientFactoryError {
    #[error("missing API key: the {0:?} provider requires APP__LLM__API_KEY or API_KEY")]
    MissingApiKey(ChatProvider),
    #[error("client initialization failed: {0}")]
    InitializationFailed(#[from] ChatClientError),
}

pub struct ChatClientFactory;

impl ChatClientFactory {
    pub fn create(
        settings: &LlmSettings,
        scaffold: &ScaffoldConfig,
    ) -> Result<Arc<dyn ChatClient>, ChatClientFactoryError> {
        if scaffold.enabled || settings.provider == ChatProvider::Scaffold {
            tracing::info!("Using scaffold chat client");
            return Ok(Arc::new(ScaffoldChatClient::new(Duration::from_millis(
                scaffold.mock_response_delay_ms,
            ))));
        }

        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ChatClientFactoryError::MissingApiKey(settings.provider))?;
        let timeout = Duration::from_secs(settings.request_timeout_secs);

        match settings.provider {
            ChatProvider::Gemini => {
                tracing::info!(model = %settings.chat_model, "Using Gemini chat client");
                let options = GenerationOptions {
                    temperature: settings.temperature,
                    top_k: settings.top_k,
                    top_p: settings.top_p,
                    max_output_tokens: settings.max_output_tokens,
                };
                let mut client = GeminiClient::new(
                    api_key,
                    settings.chat_model.clone(),
                    options,
                    settings.system_prompt_template.clone(),
                    timeout,
                )?;
                if let Some(base_url) = settings.base_url.as_deref() {
                    client = client.with_base_url(base_url);
                }
                Ok(Arc::new(client))
            }
            ChatProvider::OpenAi => {
                tracing::info!(model = %settings.chat_model, "Using OpenAI-compatible chat client");
                Ok(Arc::new(OpenAiChatClient::new(
                    settings.base_url.as_deref(),
                    api_key,
                    settings.chat_model.clone(),
                    settings.max_output_tokens,
                    settings.temperature,
                    settings.system_prompt_template.clone(),
                    timeout,
                )?))
            }
            ChatProvider::Scaffold => Ok(Arc::new(ScaffoldChatClient::default())),
        }
    }
}
