//! HTTP request handlers

use super::types::{ErrorResponse, StatusResponse};
use super::AppState;
use crate::gateway::verify::{verify_signature, SubscriptionQuery, SIGNATURE_HEADER};
use crate::gateway::{Incoming, WebhookPayload};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Subscription handshake and notifications
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<String, WebhookError> {
    match query.accept(&state.config.verify_token) {
        Some(challenge) => {
            tracing::info!("Webhook verified successfully");
            Ok(challenge.to_string())
        }
        None => {
            tracing::warn!(mode = ?query.mode, "Webhook verification failed");
            Err(WebhookError::VerificationFailed)
        }
    }
}

/// Handle a notification. Anything that is not a usable message is
/// acknowledged and dropped so the platform does not redeliver it.
async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StatusResponse>, WebhookError> {
    if let Some(secret) = state.config.app_secret.as_deref() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_signature(&body, signature, secret) {
            tracing::warn!("Rejected webhook with invalid signature");
            return Err(WebhookError::InvalidSignature);
        }
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed webhook payload");
            return Ok(Json(StatusResponse::ignored()));
        }
    };

    if !payload.has_entries() {
        tracing::debug!("Ignoring webhook without entries");
        return Ok(Json(StatusResponse::ignored()));
    }

    // State advances here, before the acknowledgement. Delivery (with its
    // retries) runs after, so a slow Graph API never causes a redelivery.
    let replies: Vec<(String, String)> = payload
        .incoming()
        .into_iter()
        .map(|Incoming { sender, text }| {
            tracing::debug!(sender = %sender, text = %text, "Inbound message");
            let reply = state.engine.handle(&sender, &text);
            (sender, reply)
        })
        .collect();

    if !replies.is_empty() {
        let sender = Arc::clone(&state.sender);
        tokio::spawn(async move {
            for (to, reply) in replies {
                if let Err(e) = sender.send_text(&to, &reply).await {
                    tracing::warn!(sender = %to, error = %e, "Reply not delivered");
                }
            }
        });
    }

    Ok(Json(StatusResponse::ok()))
}

// ============================================================
// Health
// ============================================================

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

async fn get_version() -> &'static str {
    concat!("chat-responder ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum WebhookError {
    /// Handshake token or mode mismatch
    VerificationFailed,
    /// Notification signature missing or wrong
    InvalidSignature,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            // the platform expects a bare text body on the handshake
            WebhookError::VerificationFailed => {
                (StatusCode::FORBIDDEN, "Verification failed").into_response()
            }
            WebhookError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Invalid signature")),
            )
                .into_response(),
        }
    }
}
