//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the fixed parameters of the webhook registration.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Default Bot API base URL
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
/// Path segment placed between the public base URL and the bot token
pub const WEBHOOK_SUB_PATH: &str = "bot-webhook";
/// Maximum simultaneous HTTPS connections Telegram may open to the webhook
pub const WEBHOOK_MAX_CONNECTIONS: u32 = 40;
/// Update kinds Telegram should deliver to the webhook
pub const WEBHOOK_ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];
/// Default timeout for Bot API calls
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Environment variable holding the bot token
pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
/// Environment variable holding the public base URL
pub const WEBHOOK_URL_VAR: &str = "WEBHOOK_URL";

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// Telegram Bot API token
    pub bot_token: Option<String>,
    /// Public HTTPS base URL Telegram calls back to
    pub webhook_url: Option<String>,
    /// Bot API base URL (overridable for self-hosted Bot API servers)
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_string()
}

/// Build the layered configuration source.
///
/// # Errors
///
/// Returns a `ConfigError` if a configuration file is malformed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, never checked in
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Bare variables, e.g. BOT_TOKEN -> bot_token; empty values count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tg_webhook_setup::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }
}

/// Get Bot API HTTP timeout from env or default.
///
/// Environment variable: `TELEGRAM_HTTP_TIMEOUT_SECS`.
#[must_use]
pub fn get_http_timeout_secs() -> u64 {
    std::env::var("TELEGRAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(HTTP_TIMEOUT_SECS)
}
