//! Outbound delivery through the WhatsApp Cloud API

use super::error::DeliveryError;
use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Upper bound for any single wait between attempts
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Delivers reply text to a sender
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Send-message request body
#[derive(Debug, Serialize)]
struct OutboundText<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

impl<'a> OutboundText<'a> {
    fn new(to: &'a str, body: &'a str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: TextBody { body },
        }
    }
}

/// Cloud API client with retry on transient failures
pub struct WhatsAppSender {
    client: Client,
    endpoint: String,
    access_token: String,
    max_attempts: u32,
    backoff_base: Duration,
}

impl WhatsAppSender {
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.send_timeout).build()?;

        Ok(Self {
            client,
            endpoint: config.messages_url(),
            access_token: config.access_token.clone(),
            max_attempts: config.send_max_attempts.max(1),
            backoff_base: Duration::from_secs(1),
        })
    }

    #[cfg(test)]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    async fn send_once(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&OutboundText::new(to, body))
            .send()
            .await
            .map_err(|e| DeliveryError::transport(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::from_response(status, &body, retry_after))
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let mut attempt = 1;
        loop {
            match self.send_once(to, body).await {
                Ok(()) => {
                    tracing::info!(to = %to, attempt, "Message sent");
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = e
                        .retry_after
                        .unwrap_or_else(|| retry_delay(self.backoff_base, attempt))
                        .min(MAX_RETRY_DELAY);
                    tracing::warn!(
                        to = %to,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = %delay.as_millis(),
                        error = %e,
                        "Message delivery failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        to = %to,
                        attempt,
                        kind = ?e.kind,
                        error = %e,
                        "Failed to send message"
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// Exponential backoff: base, 2 * base, 4 * base, ...
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base * (1u32 << attempt.saturating_sub(1).min(6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::gateway::error::DeliveryErrorKind;
    use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(OutboundText::new("15551234567", "Hi!")).unwrap();
        assert_eq!(
            value,
            json!({
                "messaging_product": "whatsapp",
                "to": "15551234567",
                "type": "text",
                "text": {"body": "Hi!"}
            })
        );
    }

    #[test]
    fn test_retry_delay_doubles() {
        let base = Duration::from_secs(1);
        assert_eq!(retry_delay(base, 1), Duration::from_secs(1));
        assert_eq!(retry_delay(base, 2), Duration::from_secs(2));
        assert_eq!(retry_delay(base, 3), Duration::from_secs(4));
        assert_eq!(retry_delay(base, 40), Duration::from_secs(64));
    }

    const GRAPH_EXPIRED_TOKEN: &str =
        r#"{"error":{"message":"Error validating access token","type":"OAuthException","code":190}}"#;
    const GRAPH_THROUGHPUT_LIMIT: &str =
        r#"{"error":{"message":"(#130429) Rate limit hit","type":"OAuthException","code":130429}}"#;
    const GRAPH_UNDELIVERABLE: &str =
        r#"{"error":{"message":"Message Undeliverable.","type":"OAuthException","code":131026}}"#;

    #[derive(Default)]
    struct FakeGraphApi {
        /// Status and body to answer with, in order; 200 once exhausted
        script: Mutex<Vec<(u16, &'static str)>>,
        requests: Mutex<Vec<(Option<String>, Value)>>,
    }

    async fn fake_messages(
        State(api): State<Arc<FakeGraphApi>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (axum::http::StatusCode, &'static str) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        api.requests.lock().unwrap().push((auth, body));
        let mut script = api.script.lock().unwrap();
        let (code, body) = if script.is_empty() { (200, "{}") } else { script.remove(0) };
        (axum::http::StatusCode::from_u16(code).unwrap(), body)
    }

    async fn spawn_fake(script: Vec<(u16, &'static str)>) -> (Arc<FakeGraphApi>, String) {
        let api = Arc::new(FakeGraphApi {
            script: Mutex::new(script),
            ..Default::default()
        });
        let app = Router::new()
            .route("/v18.0/:phone_id/messages", post(fake_messages))
            .with_state(Arc::clone(&api));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (api, format!("http://{addr}/v18.0"))
    }

    fn sender_for(api_base: &str) -> WhatsAppSender {
        WhatsAppSender::new(&GatewayConfig::for_tests(api_base))
            .unwrap()
            .with_backoff_base(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_send_posts_envelope_with_bearer_token() {
        let (api, base) = spawn_fake(vec![]).await;
        sender_for(&base).send_text("15551234567", "Hello!").await.unwrap();

        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0.as_deref(), Some("Bearer test-access-token"));
        assert_eq!(requests[0].1["to"], "15551234567");
        assert_eq!(requests[0].1["text"]["body"], "Hello!");
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let (api, base) = spawn_fake(vec![(503, ""), (500, "")]).await;
        sender_for(&base).send_text("a", "b").await.unwrap();
        assert_eq!(api.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (api, base) = spawn_fake(vec![(503, ""); 4]).await;
        let err = sender_for(&base).send_text("a", "b").await.unwrap_err();
        assert_eq!(err.kind, DeliveryErrorKind::ServerError);
        assert_eq!(api.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let (api, base) = spawn_fake(vec![(401, GRAPH_EXPIRED_TOKEN)]).await;
        let err = sender_for(&base).send_text("a", "b").await.unwrap_err();
        assert_eq!(err.kind, DeliveryErrorKind::Auth);
        assert_eq!(err.code, Some(190));
        assert_eq!(api.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_graph_throughput_limit_is_retried() {
        let (api, base) = spawn_fake(vec![(400, GRAPH_THROUGHPUT_LIMIT)]).await;
        sender_for(&base).send_text("a", "b").await.unwrap();
        assert_eq!(api.requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_undeliverable_not_retried() {
        let (api, base) = spawn_fake(vec![(400, GRAPH_UNDELIVERABLE)]).await;
        let err = sender_for(&base).send_text("a", "b").await.unwrap_err();
        assert_eq!(err.kind, DeliveryErrorKind::InvalidRequest);
        assert_eq!(err.message, "Message Undeliverable.");
        assert_eq!(api.requests.lock().unwrap().len(), 1);
    }
}
