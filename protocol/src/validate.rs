//! Normalization and field rules for raw RSVP submissions.
//!
//! Input arrives as untyped JSON from a browser form, so every field is
//! coerced the way a loosely typed client would send it before the rules
//! run. Rules are checked in a fixed order and the first failure wins.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;

use crate::record::{Attendance, ValidRsvp};
use crate::{MAX_GUESTS, MIN_GUESTS};

#[allow(clippy::expect_used)]
static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{9,14}$").expect("valid E.164 regex"));

/// A field rule that rejected the submission.
///
/// `Display` is the exact text shown to the guest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required.")]
    NameRequired,

    #[error("Phone is required.")]
    PhoneRequired,

    #[error("Phone must be full international format, for example +27731234567.")]
    PhoneFormat,

    #[error("Attendance must be yes or no.")]
    Attendance,

    #[error("Guests must be between 1 and 10.")]
    GuestsOutOfRange,
}

/// `true` when `phone` is `+`, a digit 1-9, then 9 to 14 more digits.
pub fn is_e164(phone: &str) -> bool {
    E164.is_match(phone)
}

/// Keep only digits and `+`, then make sure the result starts with `+`.
///
/// Returns an empty string when nothing usable is left.
pub fn normalize_phone(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if cleaned.is_empty() || cleaned.starts_with('+') {
        cleaned
    } else {
        format!("+{cleaned}")
    }
}

/// Validate a raw submission body into a normalized payload.
///
/// Bodies that are not JSON objects are treated as an empty mapping.
pub fn validate_submission(body: &Value) -> Result<ValidRsvp, ValidationError> {
    let field = |key: &str| body.get(key).unwrap_or(&Value::Null);

    let name = coerce_text(field("name")).trim().to_string();
    let phone = normalize_phone(&coerce_text(field("phone")));
    let attendance = coerce_text(field("attendance")).trim().to_lowercase();
    let guests = coerce_number(field("guests"));
    let message = coerce_text(field("message")).trim().to_string();

    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if phone.is_empty() {
        return Err(ValidationError::PhoneRequired);
    }
    if !is_e164(&phone) {
        return Err(ValidationError::PhoneFormat);
    }
    let attendance = Attendance::parse(&attendance).ok_or(ValidationError::Attendance)?;
    let guests = guests
        .and_then(guest_count)
        .ok_or(ValidationError::GuestsOutOfRange)?;

    Ok(ValidRsvp {
        name,
        phone,
        attendance,
        guests,
        message,
    })
}

/// Stringify a scalar the way the form's JavaScript would.
///
/// Falsy values (`null`, `false`, `0`, `""`) and containers become empty.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => String::new(),
    }
}

/// Numeric coercion for the guest count. `None` means "not a number".
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn guest_count(n: f64) -> Option<u8> {
    let in_range = (f64::from(MIN_GUESTS)..=f64::from(MAX_GUESTS)).contains(&n);
    if n.is_finite() && n.fract() == 0.0 && in_range {
        Some(n as u8)
    } else {
        None
    }
}
