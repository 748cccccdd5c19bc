//! Raw form fields and the checks run before submitting.

use rsvp_protocol::Attendance;
use rsvp_protocol::is_e164;
use rsvp_protocol::wire::SubmitRequest;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Please complete all required fields.")]
    MissingFields,

    #[error("Enter a valid phone in international format, e.g. +27731234567.")]
    InvalidPhone,
}

/// Field values exactly as the guest typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub phone: String,
    pub attendance: String,
    pub guests: String,
    pub message: String,
}

/// Trimmed fields that passed the local checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRsvp {
    pub name: String,
    pub phone: String,
    pub attendance: String,
    pub guests: String,
    pub message: String,
}

impl FormInput {
    /// Trim fields, strip whitespace from the phone, then check required
    /// fields and the phone format in that order.
    ///
    /// The guest count is left to the backend; only a blank value is
    /// replaced with `"1"`.
    pub fn prepare(&self) -> Result<PreparedRsvp, InputError> {
        let name = self.name.trim().to_string();
        let phone: String = self.phone.chars().filter(|c| !c.is_whitespace()).collect();
        let attendance = self.attendance.trim().to_string();
        let guests = match self.guests.trim() {
            "" => "1".to_string(),
            guests => guests.to_string(),
        };
        let message = self.message.trim().to_string();

        if name.is_empty() || phone.is_empty() || attendance.is_empty() {
            return Err(InputError::MissingFields);
        }
        if !is_e164(&phone) {
            return Err(InputError::InvalidPhone);
        }

        Ok(PreparedRsvp {
            name,
            phone,
            attendance,
            guests,
            message,
        })
    }
}

impl PreparedRsvp {
    /// Label shown in the manual WhatsApp message. Anything but `yes` reads
    /// as not attending.
    pub fn attendance_label(&self) -> &'static str {
        match Attendance::parse(&self.attendance.to_ascii_lowercase()) {
            Some(Attendance::Yes) => Attendance::Yes.label(),
            _ => Attendance::No.label(),
        }
    }

    pub fn to_request(&self) -> SubmitRequest {
        SubmitRequest {
            name: self.name.clone(),
            phone: self.phone.clone(),
            attendance: self.attendance.clone(),
            guests: self.guests.clone(),
            message: self.message.clone(),
        }
    }
}
