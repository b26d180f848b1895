//! Service configuration
//!
//! Loaded from environment variables (a `.env` file is honoured by `main`).
//! Empty values count as unset.

use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v18.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEND_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Gateway and delivery settings
#[derive(Clone)]
pub struct GatewayConfig {
    /// Cloud API access token (`TOKEN`)
    pub access_token: String,
    /// Sending phone number id (`PHONE_NUMBER_ID`)
    pub phone_number_id: String,
    /// Subscription handshake token (`VERIFY_TOKEN`)
    pub verify_token: String,
    /// When set, notifications must carry a valid `X-Hub-Signature-256`
    pub app_secret: Option<String>,
    /// Graph API base, version included (`WHATSAPP_API_BASE`)
    pub api_base: String,
    pub port: u16,
    pub send_timeout: Duration,
    pub send_max_attempts: u32,
    /// Evict senders idle for longer than this; `None` keeps them forever
    pub state_idle_ttl: Option<Duration>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let state_idle_ttl = parse_opt::<u64>(get("STATE_IDLE_TTL_SECS"), "STATE_IDLE_TTL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            access_token: require("TOKEN")?,
            phone_number_id: require("PHONE_NUMBER_ID")?,
            verify_token: require("VERIFY_TOKEN")?,
            app_secret: get("APP_SECRET"),
            api_base: get("WHATSAPP_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            port: parse_opt(get("PORT"), "PORT")?.unwrap_or(DEFAULT_PORT),
            send_timeout: Duration::from_secs(
                parse_opt(get("SEND_TIMEOUT_SECS"), "SEND_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_SEND_TIMEOUT_SECS),
            ),
            send_max_attempts: parse_opt(get("SEND_MAX_ATTEMPTS"), "SEND_MAX_ATTEMPTS")?
                .unwrap_or(DEFAULT_SEND_MAX_ATTEMPTS),
            state_idle_ttl,
        })
    }

    /// Send-message endpoint for the configured phone number
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.phone_number_id
        )
    }

    #[cfg(test)]
    pub fn for_tests(api_base: &str) -> Self {
        Self {
            access_token: "test-access-token".to_string(),
            phone_number_id: "1234567890".to_string(),
            verify_token: "test-verify-token".to_string(),
            app_secret: None,
            api_base: api_base.to_string(),
            port: 0,
            send_timeout: Duration::from_secs(5),
            send_max_attempts: DEFAULT_SEND_MAX_ATTEMPTS,
            state_idle_ttl: None,
        }
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("phone_number_id", &self.phone_number_id)
            .field("signature_check", &self.app_secret.is_some())
            .field("api_base", &self.api_base)
            .field("port", &self.port)
            .field("send_timeout", &self.send_timeout)
            .field("send_max_attempts", &self.send_max_attempts)
            .field("state_idle_ttl", &self.state_idle_ttl)
            .finish_non_exhaustive()
    }
}

fn parse_opt<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var, value: raw })
        })
        .transpose()
}
