//! WhatsApp confirmation messages.
//!
//! A notifier reports what happened as data and never fails the caller.
//! Without credentials it reports [`NotifyOutcome::NotConfigured`] and makes
//! no network calls.

use async_trait::async_trait;
use rsvp_protocol::{Attendance, RsvpRecord};
use serde::Deserialize;

use crate::config::WhatsAppConfig;

/// Fallback text when the provider rejects a message without explanation.
const SEND_FAILED: &str = "WhatsApp send failed.";

/// Result of one confirmation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    NotConfigured,
    Failed(String),
}

impl NotifyOutcome {
    pub fn sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// The failure text, if the attempt was made and failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            Self::Sent | Self::NotConfigured => None,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn send_confirmation(&self, rsvp: &RsvpRecord) -> NotifyOutcome;
}

/// Message text sent to a guest after their RSVP is stored.
pub fn confirmation_body(rsvp: &RsvpRecord, signature: &str) -> String {
    let attendance_text = match rsvp.attendance {
        Attendance::Yes => "Great news, we received your RSVP as attending.",
        Attendance::No => "We received your RSVP.",
    };
    [
        format!("Hi {},", rsvp.name),
        attendance_text.to_string(),
        "Thank you for responding to our wedding invitation.".to_string(),
        format!("With love, {signature}"),
    ]
    .join(" ")
}

/// Twilio error response format.
#[derive(Debug, Deserialize)]
struct TwilioError {
    message: Option<String>,
}

/// Sends confirmations through the Twilio Messages API.
pub struct WhatsAppNotifier {
    channel: Option<Channel>,
    signature: String,
}

struct Channel {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppNotifier {
    /// `config` of `None` yields a notifier that never sends.
    pub fn new(config: Option<WhatsAppConfig>, signature: impl Into<String>) -> Self {
        let channel = config.map(|config| Channel {
            client: reqwest::Client::builder()
                .timeout(config.timeout)
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!("Falling back to default HTTP client: {e}");
                    reqwest::Client::new()
                }),
            config,
        });
        Self {
            channel,
            signature: signature.into(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, String::new())
    }
}

impl Channel {
    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid,
        )
    }

    async fn send(&self, to: &str, body: &str) -> Result<(), String> {
        let to = format!("whatsapp:{to}");
        let form = [
            ("From", self.config.from.as_str()),
            ("To", to.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Twilio request failed: {e}");
                // The request URL carries the account SID.
                e.without_url().to_string()
            })?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let message = response
            .json::<TwilioError>()
            .await
            .ok()
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| SEND_FAILED.to_string());
        tracing::debug!("Twilio rejected message ({status}): {message}");
        Err(message)
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    fn is_configured(&self) -> bool {
        self.channel.is_some()
    }

    async fn send_confirmation(&self, rsvp: &RsvpRecord) -> NotifyOutcome {
        let Some(channel) = &self.channel else {
            return NotifyOutcome::NotConfigured;
        };

        let body = confirmation_body(rsvp, &self.signature);
        match channel.send(&rsvp.phone, &body).await {
            Ok(()) => NotifyOutcome::Sent,
            Err(reason) => NotifyOutcome::Failed(reason),
        }
    }
}
