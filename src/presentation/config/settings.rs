use config::{Config, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;

use super::Environment;
use crate::infrastructure::llm::DEFAULT_SYSTEM_PROMPT_TEMPLATE;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub viewer: ViewerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProvider {
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    Scaffold,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub provider: ChatProvider,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    pub chat_model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    pub request_timeout_secs: u64,
    pub system_prompt_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerSettings {
    pub max_extracted_pages: u32,
    pub max_upload_mb: usize,
    #[serde(default)]
    pub pdfium_library_dir: Option<String>,
}

impl ViewerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Defaults, then `appsettings.{environment}` if present, then `APP__*`
    /// environment variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let configuration = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("llm.provider", "gemini")?
            .set_default("llm.chat_model", "gemini-2.5-flash")?
            .set_default("llm.request_timeout_secs", 60)?
            .set_default("llm.system_prompt_template", DEFAULT_SYSTEM_PROMPT_TEMPLATE)?
            .set_default("viewer.max_extracted_pages", 50)?
            .set_default("viewer.max_upload_mb", 50)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str().to_lowercase()))
                    .required(false),
            )
            .add_source(EnvironmentSource::with_prefix("APP").separator("__"))
            .build()?;

        let mut settings: Settings = configuration.try_deserialize()?;
        if settings.llm.api_key.as_deref().is_none_or(str::is_empty) {
            settings.llm.api_key = std::env::var("API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty());
        }
        Ok(settings)
    }
}
