//! The RSVP record, the only entity that crosses the system boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the guest is coming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
}

impl Attendance {
    /// Parse an already trimmed, lower-cased attendance value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Human label used in manually composed WhatsApp messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes, attending",
            Self::No => "No, not attending",
        }
    }
}

impl std::fmt::Display for Attendance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission that passed every field rule, ready to be stamped and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRsvp {
    pub name: String,
    /// E.164, e.g. `+27731234567`.
    pub phone: String,
    pub attendance: Attendance,
    pub guests: u8,
    /// Trimmed free text, possibly empty.
    pub message: String,
}

/// One stored RSVP. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub phone: String,
    pub attendance: Attendance,
    pub guests: u8,
    #[serde(default)]
    pub message: String,
}

impl RsvpRecord {
    pub fn from_valid(id: String, created_at: DateTime<Utc>, valid: ValidRsvp) -> Self {
        let ValidRsvp {
            name,
            phone,
            attendance,
            guests,
            message,
        } = valid;
        Self {
            id,
            created_at,
            name,
            phone,
            attendance,
            guests,
            message,
        }
    }
}
