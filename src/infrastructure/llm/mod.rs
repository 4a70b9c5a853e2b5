mod chat_client_factory;
mod gemini_client;
mod openai_chat_client;
mod scaffold_chat_client;
mod system_prompt;

pub use chat_client_factory::{ChatClientFactory, ChatClientFactoryError};
pub use gemini_client::{GeminiClient, GenerationOptions};
pub use openai_chat_client::OpenAiChatClient;
pub use scaffold_chat_client::ScaffoldChatClient;
pub use system_prompt::{DEFAULT_SYSTEM_PROMPT_TEMPLATE, render_system_prompt};
