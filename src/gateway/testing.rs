//! Mock sender for testing
//!
//! Records deliveries instead of calling the Cloud API.

use super::error::DeliveryError;
use super::whatsapp::MessageSender;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// Sender that records every delivery
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
    delay: Mutex<Option<Duration>>,
    delivered: Notify,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail with a server error
    pub fn fail_deliveries(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Hold every subsequent delivery for `delay` before recording it
    pub fn slow_deliveries(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// `(to, body)` pairs in delivery order, including failed attempts
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait until at least `count` deliveries were recorded
    pub async fn wait_for(&self, count: usize) -> Vec<(String, String)> {
        let wait = async {
            loop {
                let sent = self.sent();
                if sent.len() >= count {
                    return sent;
                }
                self.delivered.notified().await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .unwrap_or_else(|_| panic!("expected {count} deliveries, got {:?}", self.sent()))
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), DeliveryError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        self.delivered.notify_one();

        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::from_response(
                StatusCode::SERVICE_UNAVAILABLE,
                r#"{"error":{"message":"Service temporarily unavailable","code":2}}"#,
                None,
            ));
        }
        Ok(())
    }
}
