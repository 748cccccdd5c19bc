//! Submit orchestration for the RSVP form.
//!
//! A submit runs the local checks, posts the fields to the backend and
//! reports a status banner. If the backend cannot take the RSVP for any
//! reason the prefilled WhatsApp link is opened instead, so the guest never
//! ends up with nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Client;
use rsvp_protocol::wire::SubmitReply;

use crate::fallback::{LinkOpener, fallback_link};
use crate::input::{FormInput, InputError, PreparedRsvp};

/// Upper bound on a single backend round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const GENERIC_FAILURE: &str = "Could not submit RSVP.";

// ─────────────────────────────────────────────────────────────────────────────
// Submit control
// ─────────────────────────────────────────────────────────────────────────────

/// State of the submit button.
///
/// Disabled while a submission is in flight and re-enabled when the
/// [`SubmitGuard`] drops, whatever the outcome.
#[derive(Debug, Default)]
pub struct SubmitControl {
    in_flight: AtomicBool,
}

impl SubmitControl {
    pub const IDLE_LABEL: &'static str = "Send RSVP";
    pub const BUSY_LABEL: &'static str = "Sending...";

    pub fn is_enabled(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    pub fn label(&self) -> &'static str {
        if self.is_enabled() {
            Self::IDLE_LABEL
        } else {
            Self::BUSY_LABEL
        }
    }

    /// Disable the control. `None` when a submission already holds it.
    pub fn begin(&self) -> Option<SubmitGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard { control: self })
    }
}

#[derive(Debug)]
pub struct SubmitGuard<'a> {
    control: &'a SubmitControl,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.control.in_flight.store(false, Ordering::Release);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] InputError),

    #[error("An RSVP is already being sent.")]
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The backend stored the RSVP.
    Saved {
        rsvp_id: Option<String>,
        whatsapp_sent: bool,
        whatsapp_error: Option<String>,
    },
    /// The backend was unavailable; the guest was sent to `link`.
    Fallback { link: String, reason: String },
}

impl FormOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// Banner shown to the guest after a submit.
    pub fn status_message(&self) -> String {
        match self {
            Self::Saved {
                whatsapp_sent: true,
                ..
            } => "Thank you. RSVP saved and WhatsApp confirmation sent.".to_string(),
            Self::Saved { whatsapp_error, .. } => {
                let detail = whatsapp_error
                    .as_deref()
                    .filter(|e| !e.is_empty())
                    .map(|e| format!(" Details: {e}"))
                    .unwrap_or_default();
                format!("Thank you. RSVP saved, but WhatsApp was not sent.{detail}")
            }
            Self::Fallback { .. } => {
                "Server is unavailable. WhatsApp was opened so you can still submit manually."
                    .to_string()
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum Unavailable {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Refused { status: u16, message: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

pub struct FormController {
    client: Client,
    api_url: String,
    couple_number: String,
    opener: Arc<dyn LinkOpener>,
    control: SubmitControl,
}

impl FormController {
    pub fn new(
        api_url: impl Into<String>,
        couple_number: impl Into<String>,
        opener: Arc<dyn LinkOpener>,
    ) -> Self {
        Self {
            client: build_client(DEFAULT_REQUEST_TIMEOUT),
            api_url: api_url.into(),
            couple_number: couple_number.into(),
            opener,
            control: SubmitControl::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn control(&self) -> &SubmitControl {
        &self.control
    }

    /// Submit the form once.
    ///
    /// Local check failures come back as [`FormError::Invalid`] without
    /// touching the network. Every backend failure, including a reply with
    /// `ok: false`, opens the fallback link and yields
    /// [`FormOutcome::Fallback`].
    pub async fn submit(&self, input: &FormInput) -> Result<FormOutcome, FormError> {
        let _guard = self.control.begin().ok_or(FormError::InFlight)?;
        let prepared = input.prepare()?;
        let link = fallback_link(&self.couple_number, &prepared);

        match self.post(&prepared).await {
            Ok(reply) => {
                tracing::info!(rsvp_id = ?reply.rsvp_id, "RSVP saved");
                Ok(FormOutcome::Saved {
                    rsvp_id: reply.rsvp_id,
                    whatsapp_sent: reply.whatsapp_sent,
                    whatsapp_error: reply.whatsapp_error,
                })
            }
            Err(e) => {
                tracing::error!("RSVP submit failed: {e}");
                if let Err(open_err) = self.opener.open(&link) {
                    tracing::warn!("Failed to open WhatsApp link: {open_err}");
                }
                Ok(FormOutcome::Fallback {
                    link,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn post(&self, prepared: &PreparedRsvp) -> Result<SubmitReply, Unavailable> {
        let resp = self
            .client
            .post(&self.api_url)
            .json(&prepared.to_request())
            .send()
            .await?;
        let status = resp.status();
        // Non-JSON bodies decode as an empty reply.
        let reply: SubmitReply = resp.json().await.unwrap_or_default();

        if !status.is_success() || reply.ok == Some(false) {
            return Err(Unavailable::Refused {
                status: status.as_u16(),
                message: reply.error.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            });
        }
        Ok(reply)
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::warn!("Falling back to default HTTP client: {e}");
        Client::new()
    })
}
