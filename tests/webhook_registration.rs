use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tg_webhook_setup::config::Settings;
use tg_webhook_setup::webhook::{
    build_registration_request, delete_webhook, execute_registration, fetch_webhook_info,
    register_webhook, BotApi, ConfigurationError, HttpBotApi, RegistrationOutcome,
    TransportError, WebhookConfig,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Counts calls and never answers
#[derive(Default)]
struct CountingApi {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl BotApi for CountingApi {
    async fn post_json(&self, _endpoint: &str, _body: &Value) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Network("unreachable".to_string()))
    }

    async fn get_json(&self, _endpoint: &str) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Network("unreachable".to_string()))
    }
}

fn settings_for(server: &MockServer) -> Settings {
    Settings {
        bot_token: Some("123:ABC".to_string()),
        webhook_url: Some("https://example.com".to_string()),
        telegram_api_url: server.uri(),
    }
}

fn http_api() -> Result<HttpBotApi, TransportError> {
    HttpBotApi::new(Duration::from_secs(5))
}

#[tokio::test]
async fn test_missing_configuration_never_reaches_network() {
    let api = CountingApi::default();
    let settings = Settings {
        bot_token: None,
        webhook_url: None,
        telegram_api_url: "https://api.telegram.org".to_string(),
    };

    let result = register_webhook(&api, &settings).await;

    assert_eq!(
        result,
        Err(ConfigurationError::Missing {
            names: vec!["BOT_TOKEN", "WEBHOOK_URL"]
        })
    );
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_end_to_end_registration_is_acknowledged() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/setWebhook"))
        .and(body_json(json!({
            "url": "https://example.com/bot-webhook/123:ABC",
            "max_connections": 40,
            "allowed_updates": ["message", "callback_query"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": true,
            "description": "Webhook was set"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = register_webhook(&http_api()?, &settings_for(&server)).await?;

    assert_eq!(
        outcome,
        RegistrationOutcome::Acknowledged {
            description: "Webhook was set".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_bad_request_is_rejected_with_payload() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let payload = json!({
        "ok": false,
        "error_code": 400,
        "description": "Bad Request: bad webhook: HTTPS url must be provided for webhook"
    });
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/setWebhook"))
        .respond_with(ResponseTemplate::new(400).set_body_json(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let config = WebhookConfig::from_settings(&settings_for(&server))?;
    let request = build_registration_request(&config);
    let outcome = execute_registration(&http_api()?, &request).await;

    assert_eq!(outcome, RegistrationOutcome::Rejected { reason: payload });
    Ok(())
}

#[tokio::test]
async fn test_unreachable_api_is_transport_failure() -> anyhow::Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let settings = Settings {
        bot_token: Some("123:ABC".to_string()),
        webhook_url: Some("https://example.com".to_string()),
        telegram_api_url: format!("http://{addr}"),
    };

    let outcome = register_webhook(&http_api()?, &settings).await?;

    let RegistrationOutcome::TransportFailure { message } = outcome else {
        panic!("expected transport failure, got {outcome:?}");
    };
    assert!(!message.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_delete_and_info_round() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bot123:ABC/deleteWebhook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": true,
            "description": "Webhook was deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bot123:ABC/getWebhookInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "url": "",
                "has_custom_certificate": false,
                "pending_update_count": 0
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = http_api()?;
    let config = WebhookConfig::from_settings(&settings_for(&server))?;

    let outcome = delete_webhook(&api, &config).await;
    assert!(outcome.is_acknowledged());

    let info = fetch_webhook_info(&api, &config).await?;
    assert!(info.url.is_empty());
    assert_eq!(info.pending_update_count, 0);
    Ok(())
}
