//! Configuration validation
//!
//! Turns the raw token and base URL into a [`WebhookConfig`] before any
//! request is built.

use crate::config::{Settings, BOT_TOKEN_VAR, DEFAULT_TELEGRAM_API_URL, WEBHOOK_URL_VAR};
use reqwest::Url;
use thiserror::Error;

/// Required configuration is missing or unusable
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// One or both required variables are absent or empty
    #[error("Missing environment variable(s): {}", .names.join(", "))]
    Missing {
        /// Names of the missing variables, in declaration order
        names: Vec<&'static str>,
    },
    /// The base URL is not a well-formed HTTPS URL
    #[error("Invalid WEBHOOK_URL '{url}': {reason}")]
    InvalidWebhookUrl {
        /// Value as configured
        url: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Validated inputs of a webhook operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    bot_token: String,
    webhook_url: String,
    api_url: String,
}

impl WebhookConfig {
    /// Validate the token and base URL, using the default Bot API base URL.
    ///
    /// Both values are checked before reporting, so a single error names
    /// every missing variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Missing` if either value is absent or blank,
    /// `ConfigurationError::InvalidWebhookUrl` if the base URL is not HTTPS.
    pub fn validate(
        bot_token: Option<&str>,
        webhook_url: Option<&str>,
    ) -> Result<Self, ConfigurationError> {
        Self::validate_with_api_url(bot_token, webhook_url, DEFAULT_TELEGRAM_API_URL)
    }

    /// Validate the token and base URL against a custom Bot API base URL.
    ///
    /// # Errors
    ///
    /// See [`WebhookConfig::validate`].
    pub fn validate_with_api_url(
        bot_token: Option<&str>,
        webhook_url: Option<&str>,
        api_url: &str,
    ) -> Result<Self, ConfigurationError> {
        let bot_token = non_blank(bot_token);
        let webhook_url = non_blank(webhook_url);

        let (bot_token, webhook_url) = match (bot_token, webhook_url) {
            (Some(token), Some(url)) => (token, url),
            (token, url) => {
                let mut names = Vec::with_capacity(2);
                if token.is_none() {
                    names.push(BOT_TOKEN_VAR);
                }
                if url.is_none() {
                    names.push(WEBHOOK_URL_VAR);
                }
                return Err(ConfigurationError::Missing { names });
            }
        };

        check_https(webhook_url)?;

        Ok(Self {
            bot_token: bot_token.to_string(),
            webhook_url: webhook_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Validate the values carried by loaded [`Settings`].
    ///
    /// # Errors
    ///
    /// See [`WebhookConfig::validate`].
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
        Self::validate_with_api_url(
            settings.bot_token.as_deref(),
            settings.webhook_url.as_deref(),
            &settings.telegram_api_url,
        )
    }

    /// Bot token
    #[must_use]
    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    /// Public base URL without trailing slash
    #[must_use]
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Bot API base URL without trailing slash
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_https(url: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidWebhookUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if parsed.scheme() != "https" {
        return Err(invalid(format!(
            "scheme must be https, got {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("no host".to_string()));
    }
    Ok(())
}
