//! `rsvp-protocol`: types shared by the RSVP service and the RSVP form.
//!
//! - [`record`]: the persisted RSVP record and its attendance enum
//! - [`wire`]: JSON bodies exchanged over `/api/*`
//! - [`validate`]: normalization and field rules for raw submissions

pub mod record;
pub mod validate;
pub mod wire;

pub use record::{Attendance, RsvpRecord, ValidRsvp};
pub use validate::{ValidationError, is_e164, normalize_phone, validate_submission};

/// Service identifier reported by `GET /api/health`.
pub const SERVICE_NAME: &str = "rsvp-backend";

/// Inclusive bounds on the party size of a single RSVP.
pub const MIN_GUESTS: u8 = 1;
pub const MAX_GUESTS: u8 = 10;
