//! `setWebhook` request construction

use crate::config::{WEBHOOK_ALLOWED_UPDATES, WEBHOOK_MAX_CONNECTIONS, WEBHOOK_SUB_PATH};
use crate::webhook::WebhookConfig;
use serde::Serialize;

/// JSON body of a `setWebhook` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetWebhookBody {
    /// Token-scoped callback URL
    pub url: String,
    /// Maximum simultaneous connections Telegram may open
    pub max_connections: u32,
    /// Update kinds Telegram should deliver
    pub allowed_updates: Vec<String>,
}

/// Fully resolved `setWebhook` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Bot API method URL
    pub endpoint: String,
    /// Request payload
    pub body: SetWebhookBody,
}

/// Bot API method URL: `{api_url}/bot{token}/{method}`
#[must_use]
pub fn method_endpoint(api_url: &str, bot_token: &str, method: &str) -> String {
    format!("{api_url}/bot{bot_token}/{method}")
}

/// Callback URL Telegram will deliver updates to: `{base}/bot-webhook/{token}`
#[must_use]
pub fn callback_url(config: &WebhookConfig) -> String {
    format!(
        "{}/{WEBHOOK_SUB_PATH}/{}",
        config.webhook_url(),
        config.bot_token()
    )
}

/// Build the `setWebhook` call for a validated configuration.
#[must_use]
pub fn build_registration_request(config: &WebhookConfig) -> RegistrationRequest {
    RegistrationRequest {
        endpoint: method_endpoint(config.api_url(), config.bot_token(), "setWebhook"),
        body: SetWebhookBody {
            url: callback_url(config),
            max_connections: WEBHOOK_MAX_CONNECTIONS,
            allowed_updates: WEBHOOK_ALLOWED_UPDATES
                .iter()
                .map(ToString::to_string)
                .collect(),
        },
    }
}
