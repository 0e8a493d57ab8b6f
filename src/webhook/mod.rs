//! Webhook registration
//!
//! Validation, request construction and a single `setWebhook` call, plus the
//! `deleteWebhook` and `getWebhookInfo` companions.

mod executor;
mod request;
mod transport;
mod validator;

pub use executor::{
    classify_answer, delete_webhook, execute_registration, fetch_webhook_info,
    RegistrationOutcome, WebhookError, WebhookInfo,
};
pub use request::{
    build_registration_request, callback_url, method_endpoint, RegistrationRequest,
    SetWebhookBody,
};
pub use transport::{BotApi, HttpBotApi, TransportError};
pub use validator::{ConfigurationError, WebhookConfig};

use crate::config::Settings;

/// Validate `settings`, then register the webhook.
///
/// No call reaches `api` unless validation succeeds. The outcome is logged
/// by the executor; callers only decide what to do with it.
///
/// # Errors
///
/// Returns `ConfigurationError` if the token or base URL is missing or invalid.
/// Rejections and transport failures are reported through the outcome.
pub async fn register_webhook(
    api: &dyn BotApi,
    settings: &Settings,
) -> Result<RegistrationOutcome, ConfigurationError> {
    let config = WebhookConfig::from_settings(settings)?;
    let request = build_registration_request(&config);
    Ok(execute_registration(api, &request).await)
}

#[cfg(test)]
mod tests {
    use super::transport::MockBotApi;
    use super::*;
    use serde_json::json;

    fn settings(token: Option<&str>, url: Option<&str>) -> Settings {
        Settings {
            bot_token: token.map(ToString::to_string),
            webhook_url: url.map(ToString::to_string),
            telegram_api_url: crate::config::DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_configuration_makes_no_call() {
        let cases = [
            (None, None),
            (Some("123:ABC"), None),
            (None, Some("https://example.com")),
            (Some(""), Some("https://example.com")),
            (Some("123:ABC"), Some("")),
        ];

        for (token, url) in cases {
            let mut api = MockBotApi::new();
            api.expect_post_json().times(0);
            api.expect_get_json().times(0);

            let result = register_webhook(&api, &settings(token, url)).await;

            assert!(
                matches!(result, Err(ConfigurationError::Missing { .. })),
                "token={token:?} url={url:?} gave {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_plain_http_url_makes_no_call() {
        let mut api = MockBotApi::new();
        api.expect_post_json().times(0);
        api.expect_get_json().times(0);

        let result = register_webhook(
            &api,
            &settings(Some("123:ABC"), Some("http://example.com")),
        )
        .await;

        assert!(
            matches!(result, Err(ConfigurationError::InvalidWebhookUrl { .. })),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn test_valid_configuration_registers_once() -> Result<(), ConfigurationError> {
        let mut api = MockBotApi::new();
        api.expect_post_json()
            .times(1)
            .returning(|_, _| Ok(json!({"ok": true, "description": "Webhook was set"})));

        let outcome = register_webhook(
            &api,
            &settings(Some("123:ABC"), Some("https://example.com")),
        )
        .await?;

        assert_eq!(
            outcome,
            RegistrationOutcome::Acknowledged {
                description: "Webhook was set".to_string()
            }
        );
        Ok(())
    }
}
