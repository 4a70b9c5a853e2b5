/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn with_level(mut self, level: &str) -> Self {
        self.default_filter = format!("{level},lectern=debug,tower_http=debug");
        self
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            default_filter: "info,lectern=debug,tower_http=debug".to_string(),
        }
    }
}
