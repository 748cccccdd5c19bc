//! JSON bodies of the `/api/*` endpoints.
//!
//! Keys are camelCase on the wire. Every body carries `ok` so browser code
//! can branch on a single field regardless of status code.

use serde::{Deserialize, Serialize};

use crate::record::RsvpRecord;

// ─────────────────────────────────────────────────────────────────────────────
// GET /api/health
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhatsAppStatus {
    Configured,
    NotConfigured,
}

impl WhatsAppStatus {
    pub fn from_configured(configured: bool) -> Self {
        if configured {
            Self::Configured
        } else {
            Self::NotConfigured
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::NotConfigured => "not-configured",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub whatsapp: WhatsAppStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// POST /api/rsvp
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ok: bool,
    pub rsvp_id: String,
    pub whatsapp_sent: bool,
    /// Absent when the message was sent or the channel is not configured.
    pub whatsapp_error: Option<String>,
}

/// Outgoing form body. Guest count travels as the string the form field held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub name: String,
    pub phone: String,
    pub attendance: String,
    pub guests: String,
    pub message: String,
}

/// Client-side view of any `/api/rsvp` reply.
///
/// Decodes success and error bodies alike; fields the server left out fall
/// back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitReply {
    pub ok: Option<bool>,
    pub rsvp_id: Option<String>,
    pub whatsapp_sent: bool,
    pub whatsapp_error: Option<String>,
    pub error: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// GET /api/rsvps
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub ok: bool,
    pub total: usize,
    pub items: Vec<RsvpRecord>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors (400 / 500)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}
