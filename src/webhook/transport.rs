//! HTTP transport for Bot API calls
//!
//! Telegram answers rejected calls with a 4xx status and a JSON body
//! (`{"ok": false, ...}`), so the status code alone is not a failure here:
//! any JSON body is handed back for classification.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Longest body excerpt carried in a `MalformedResponse` error
const MAX_ERROR_BODY_LEN: usize = 500;

/// A Bot API call that did not produce a JSON answer
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established or was interrupted
    #[error("Network error: {0}")]
    Network(String),
    /// No answer within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// The answer was not a JSON document
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_builder() {
            Self::Client(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Raw access to Bot API methods
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BotApi: Send + Sync {
    /// POST a JSON body to `endpoint` and return the decoded JSON answer
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, TransportError>;

    /// GET `endpoint` and return the decoded JSON answer
    async fn get_json(&self, endpoint: &str) -> Result<Value, TransportError>;
}

/// [`BotApi`] over HTTPS with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpBotApi {
    client: HttpClient,
}

impl HttpBotApi {
    /// Create a client whose every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Client` if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn decode(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        let text = response.text().await?;
        debug!(status = %status, bytes = text.len(), "Bot API answered");

        serde_json::from_str(&text).map_err(|e| {
            TransportError::MalformedResponse(format!(
                "{status}: {} ({e})",
                summarize_body(&text)
            ))
        })
    }
}

#[async_trait]
impl BotApi for HttpBotApi {
    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self.client.post(endpoint).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json(&self, endpoint: &str) -> Result<Value, TransportError> {
        let response = self.client.get(endpoint).send().await?;
        Self::decode(response).await
    }
}

/// Short description of a non-JSON body for error messages.
fn summarize_body(text: &str) -> String {
    let trimmed = text.trim_start();
    // Nginx and other proxies answer with HTML error pages
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        "server returned HTML error page".to_string()
    } else if trimmed.is_empty() {
        "empty body".to_string()
    } else if text.len() > MAX_ERROR_BODY_LEN {
        let mut end = MAX_ERROR_BODY_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &text[..end])
    } else {
        text.to_string()
    }
}
