//! Service configuration, read once at startup.
//!
//! Values come from the process environment after an optional `.env` file
//! has been loaded. Empty values count as unset.
//!
//! | Variable                   | Default                  |
//! |----------------------------|--------------------------|
//! | `PORT`                     | `3000`                   |
//! | `RSVP_BIND_HOST`           | `0.0.0.0`                |
//! | `RSVP_DATA_DIR`            | `data`                   |
//! | `TWILIO_ACCOUNT_SID`       | unset                    |
//! | `TWILIO_AUTH_TOKEN`        | unset                    |
//! | `TWILIO_WHATSAPP_FROM`     | unset                    |
//! | `TWILIO_API_BASE`          | `https://api.twilio.com` |
//! | `RSVP_SIGNATURE`           | `Name1 and Name2`        |
//! | `RSVP_NOTIFY_TIMEOUT_SECS` | `10`                     |

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_SIGNATURE: &str = "Name1 and Name2";
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for ${var}: '{value}' (expected: {expected})")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Credentials and sender identity for the WhatsApp channel.
#[derive(Clone)]
pub struct WhatsAppConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender, e.g. `whatsapp:+14155238886`.
    pub from: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from", &self.from)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_host: IpAddr,
    pub port: u16,
    pub data_dir: PathBuf,
    /// `None` unless SID, token and sender are all present.
    pub whatsapp: Option<WhatsAppConfig>,
    /// Closing line of confirmation messages.
    pub signature: String,
}

impl ServiceConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                var: "PORT",
                value: v,
                expected: "a TCP port number",
            })?,
            None => DEFAULT_PORT,
        };

        let bind_host = match get("RSVP_BIND_HOST") {
            Some(v) => v.parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
                var: "RSVP_BIND_HOST",
                value: v,
                expected: "an IP address",
            })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let timeout_secs = match get("RSVP_NOTIFY_TIMEOUT_SECS") {
            Some(v) => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "RSVP_NOTIFY_TIMEOUT_SECS",
                        value: v,
                        expected: "a positive number of seconds",
                    });
                }
            },
            None => DEFAULT_NOTIFY_TIMEOUT_SECS,
        };

        let whatsapp = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_WHATSAPP_FROM"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from)) => Some(WhatsAppConfig {
                account_sid,
                auth_token,
                from,
                api_base: get("TWILIO_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            }),
            _ => None,
        };

        Ok(Self {
            bind_host,
            port,
            data_dir: get("RSVP_DATA_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            whatsapp,
            signature: get("RSVP_SIGNATURE").unwrap_or_else(|| DEFAULT_SIGNATURE.to_string()),
        })
    }
}
