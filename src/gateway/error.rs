//! Cloud API delivery failures
//!
//! A failed send carries a Graph API error body of the form
//! `{"error":{"message":..,"type":..,"code":..,"error_subcode":..}}`.
//! The error code is more precise than the HTTP status (throughput limits
//! arrive as 400 with code 130429, for instance), so it wins when present.

use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Graph codes for throughput, spam and pair rate limits
const RATE_LIMIT_CODES: &[i64] = &[4, 80007, 130_429, 131_048, 131_056];
/// Expired or invalid token, missing permissions
const AUTH_CODES: &[i64] = &[0, 10, 190];
/// Unknown or temporarily unavailable on the platform side
const SERVER_CODES: &[i64] = &[1, 2, 131_000, 131_016];

#[derive(Debug, Error)]
#[error("{kind} delivery failure{}: {message}", code_suffix(.code))]
pub struct DeliveryError {
    pub kind: DeliveryErrorKind,
    /// Graph API error code, when the response carried one
    pub code: Option<i64>,
    pub message: String,
    /// Server-requested wait from a `Retry-After` header
    pub retry_after: Option<Duration>,
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" (code {c})")).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryErrorKind {
    /// Connect failure or timeout
    Network,
    RateLimit,
    ServerError,
    /// Bad or expired access token, missing permission
    Auth,
    /// Rejected payload, unknown recipient, closed messaging window
    InvalidRequest,
    Unknown,
}

impl DeliveryErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }

    fn from_graph_code(code: i64) -> Option<Self> {
        if RATE_LIMIT_CODES.contains(&code) {
            Some(Self::RateLimit)
        } else if AUTH_CODES.contains(&code) || (200..=299).contains(&code) {
            Some(Self::Auth)
        } else if SERVER_CODES.contains(&code) {
            Some(Self::ServerError)
        } else {
            None
        }
    }

    fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth,
            429 => Self::RateLimit,
            400 | 404 | 422 => Self::InvalidRequest,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for DeliveryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Network => "network",
            Self::RateLimit => "rate-limit",
            Self::ServerError => "server",
            Self::Auth => "auth",
            Self::InvalidRequest => "invalid-request",
            Self::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
    code: Option<i64>,
}

impl DeliveryError {
    /// Classify a non-success response from the send endpoint
    pub fn from_response(status: StatusCode, body: &str, retry_after: Option<Duration>) -> Self {
        let graph = serde_json::from_str::<GraphErrorBody>(body).ok().map(|b| b.error);
        let code = graph.as_ref().and_then(|g| g.code);

        let kind = code
            .and_then(DeliveryErrorKind::from_graph_code)
            .unwrap_or_else(|| DeliveryErrorKind::from_status(status));

        let message = match graph {
            Some(g) if !g.message.is_empty() => g.message,
            _ if body.trim().is_empty() => format!("HTTP {status}"),
            _ => format!("HTTP {status}: {}", body.trim()),
        };

        Self {
            kind,
            code,
            message,
            retry_after,
        }
    }

    /// The request never produced a response
    pub fn transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() || err.is_connect() {
            DeliveryErrorKind::Network
        } else {
            DeliveryErrorKind::Unknown
        };
        Self {
            kind,
            code: None,
            message: err.to_string(),
            retry_after: None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
