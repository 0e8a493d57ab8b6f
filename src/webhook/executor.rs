//! Bot API calls and classification of their answers

use crate::webhook::request::{method_endpoint, RegistrationRequest};
use crate::webhook::transport::{BotApi, TransportError};
use crate::webhook::WebhookConfig;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Result of a single `setWebhook` (or `deleteWebhook`) call
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// Telegram accepted the call
    Acknowledged {
        /// Description sent by Telegram, empty if none
        description: String,
    },
    /// Telegram understood the call and declined it
    Rejected {
        /// Complete answer, as received
        reason: Value,
    },
    /// The call did not complete
    TransportFailure {
        /// Underlying error message
        message: String,
    },
}

impl RegistrationOutcome {
    /// Whether Telegram acknowledged the call
    #[must_use]
    pub const fn is_acknowledged(&self) -> bool {
        matches!(self, Self::Acknowledged { .. })
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acknowledged { description } if description.is_empty() => {
                write!(f, "acknowledged")
            }
            Self::Acknowledged { description } => write!(f, "acknowledged: {description}"),
            Self::Rejected { reason } => write!(f, "rejected: {reason}"),
            Self::TransportFailure { message } => write!(f, "transport failure: {message}"),
        }
    }
}

impl From<TransportError> for RegistrationOutcome {
    fn from(e: TransportError) -> Self {
        Self::TransportFailure {
            message: e.to_string(),
        }
    }
}

/// Errors of calls that return data rather than an acknowledgement
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Telegram answered with `ok: false`
    #[error("Telegram rejected the request: {0}")]
    Rejected(Value),
    /// The call did not complete
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The answer did not have the expected shape
    #[error("Unexpected Bot API answer: {0}")]
    Decode(String),
}

/// Current webhook status as reported by `getWebhookInfo`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookInfo {
    /// Registered webhook URL, empty when none is set
    pub url: String,
    /// Whether a custom certificate was uploaded
    #[serde(default)]
    pub has_custom_certificate: bool,
    /// Updates waiting for delivery
    #[serde(default)]
    pub pending_update_count: u64,
    /// Resolved IP address of the webhook host
    pub ip_address: Option<String>,
    /// Unix time of the most recent delivery error
    pub last_error_date: Option<i64>,
    /// Description of the most recent delivery error
    pub last_error_message: Option<String>,
    /// Connection limit in effect
    pub max_connections: Option<u32>,
    /// Update kinds being delivered
    pub allowed_updates: Option<Vec<String>>,
}

fn is_ok(answer: &Value) -> bool {
    answer.get("ok").and_then(Value::as_bool) == Some(true)
}

/// Classify a decoded Bot API answer.
///
/// Only an explicit `"ok": true` counts as acknowledged; a false or missing
/// flag yields `Rejected` with the answer unchanged.
#[must_use]
pub fn classify_answer(answer: Value) -> RegistrationOutcome {
    if is_ok(&answer) {
        let description = answer
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        RegistrationOutcome::Acknowledged { description }
    } else {
        RegistrationOutcome::Rejected { reason: answer }
    }
}

fn log_outcome(method: &str, outcome: &RegistrationOutcome) {
    match outcome {
        RegistrationOutcome::Acknowledged { description } => {
            info!(method, description = %description, "Bot API acknowledged the call");
        }
        RegistrationOutcome::Rejected { reason } => {
            warn!(method, reason = %reason, "Bot API rejected the call");
        }
        RegistrationOutcome::TransportFailure { message } => {
            error!(method, error = %message, "Bot API call failed");
        }
    }
}

/// Submit a `setWebhook` call once and classify the answer.
///
/// Never retries; every failure is folded into the returned outcome.
#[instrument(skip_all, fields(callback = %request.body.url))]
pub async fn execute_registration(
    api: &dyn BotApi,
    request: &RegistrationRequest,
) -> RegistrationOutcome {
    let outcome = match serde_json::to_value(&request.body) {
        Ok(body) => match api.post_json(&request.endpoint, &body).await {
            Ok(answer) => classify_answer(answer),
            Err(e) => e.into(),
        },
        Err(e) => RegistrationOutcome::TransportFailure {
            message: format!("could not encode request body: {e}"),
        },
    };
    log_outcome("setWebhook", &outcome);
    outcome
}

/// Remove the webhook so the bot can go back to polling.
pub async fn delete_webhook(api: &dyn BotApi, config: &WebhookConfig) -> RegistrationOutcome {
    let endpoint = method_endpoint(config.api_url(), config.bot_token(), "deleteWebhook");
    let outcome = match api.get_json(&endpoint).await {
        Ok(answer) => classify_answer(answer),
        Err(e) => e.into(),
    };
    log_outcome("deleteWebhook", &outcome);
    outcome
}

/// Fetch the webhook status Telegram currently holds for the bot.
///
/// # Errors
///
/// Returns `WebhookError::Rejected` on `ok: false`, `WebhookError::Transport`
/// if the call fails, `WebhookError::Decode` if `result` is missing or malformed.
pub async fn fetch_webhook_info(
    api: &dyn BotApi,
    config: &WebhookConfig,
) -> Result<WebhookInfo, WebhookError> {
    let endpoint = method_endpoint(config.api_url(), config.bot_token(), "getWebhookInfo");
    let mut answer = api.get_json(&endpoint).await?;

    if !is_ok(&answer) {
        return Err(WebhookError::Rejected(answer));
    }

    let result = answer
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| WebhookError::Decode("missing result".to_string()))?;
    serde_json::from_value(result).map_err(|e| WebhookError::Decode(e.to_string()))
}
