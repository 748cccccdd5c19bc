//! `rsvp-form`: client side of the RSVP flow.
//!
//! - [`input`]: field preparation and local checks before anything leaves the machine
//! - [`fallback`]: the prefilled `wa.me` link used when the backend cannot be reached
//! - [`controller`]: submit orchestration, in-flight guard and status banners
//! - [`countdown`]: time remaining until the ceremony

pub mod controller;
pub mod countdown;
pub mod fallback;
pub mod input;

pub use controller::{FormController, FormError, FormOutcome, SubmitControl};
pub use countdown::Countdown;
pub use fallback::{BrowserOpener, LinkOpener, PrintOpener, fallback_link};
pub use input::{FormInput, InputError, PreparedRsvp};

/// Backend endpoint used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/rsvp";

/// Couple's WhatsApp number in international format without the leading `+`.
pub const DEFAULT_COUPLE_NUMBER: &str = "27700000000";

/// Ceremony start, RFC 3339.
pub const DEFAULT_WEDDING_AT: &str = "2026-03-19T15:00:00+02:00";
