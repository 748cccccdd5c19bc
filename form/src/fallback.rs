//! Manual WhatsApp fallback.
//!
//! When the backend cannot take the RSVP, the guest gets a `wa.me` link with
//! the whole RSVP prefilled so they can send it to the couple themselves.

use crate::input::PreparedRsvp;

/// Build `https://wa.me/<number>?text=<message>` for a prepared RSVP.
///
/// The message lists name, phone, attendance label and guests, plus the
/// personal message when there is one, separated by newlines.
pub fn fallback_link(couple_number: &str, rsvp: &PreparedRsvp) -> String {
    let mut lines = vec![
        "Wedding RSVP".to_string(),
        format!("Name: {}", rsvp.name),
        format!("Phone: {}", rsvp.phone),
        format!("Attendance: {}", rsvp.attendance_label()),
        format!("Guests: {}", rsvp.guests),
    ];
    if !rsvp.message.is_empty() {
        lines.push(format!("Message: {}", rsvp.message));
    }
    format!(
        "https://wa.me/{couple_number}?text={}",
        urlencoding::encode(&lines.join("\n"))
    )
}

/// Opens a URL for the guest.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Hands the link to the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserOpener;

impl LinkOpener for BrowserOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}

/// Prints the link instead of opening it. Used for `--no-browser`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintOpener;

impl LinkOpener for PrintOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        println!("Open this link to send your RSVP on WhatsApp:\n{url}");
        Ok(())
    }
}
