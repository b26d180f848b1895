//! Webhook verification
//!
//! Two checks: the subscription handshake on `GET /webhook`, and the
//! `X-Hub-Signature-256` HMAC on delivered notifications.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the notification signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Query parameters of the subscription handshake
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl SubscriptionQuery {
    /// The challenge to echo back if this is a `subscribe` request carrying
    /// `expected_token`; `None` means the handshake is rejected
    pub fn accept(&self, expected_token: &str) -> Option<&str> {
        let mode_ok = self.mode.as_deref() == Some("subscribe");
        let token_ok = self
            .verify_token
            .as_deref()
            .is_some_and(|token| constant_time_eq(token.as_bytes(), expected_token.as_bytes()));
        if mode_ok && token_ok {
            Some(self.challenge.as_deref().unwrap_or_default())
        } else {
            None
        }
    }
}

/// Verify the notification signature.
///
/// The header value has the form `sha256=<hex>` where the hex digest is
/// HMAC-SHA256 of the raw request body keyed with the app secret.
pub fn verify_signature(body: &[u8], signature_header: &str, app_secret: &str) -> bool {
    let Some(expected) = signature_header.strip_prefix("sha256=") else {
        tracing::warn!("Signature header missing sha256= prefix");
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        tracing::warn!("Failed to initialise HMAC");
        return false;
    };
    mac.update(body);
    let computed = hex::encode(mac.finalize().into_bytes());

    constant_time_eq(computed.as_bytes(), expected.to_ascii_lowercase().as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
pub(crate) fn sign(body: &[u8], app_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
