#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Form submissions against a mocked backend, an unreachable backend and
//! the real `rsvp-service` router.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use rsvp_form::{FormController, FormError, FormInput, FormOutcome, InputError, LinkOpener};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COUPLE: &str = "27700000000";

/// Remembers every link it was asked to open instead of launching a browser.
#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn jane() -> FormInput {
    FormInput {
        name: " Jane Doe ".to_string(),
        phone: "+27 73 123 4567".to_string(),
        attendance: "yes".to_string(),
        guests: "2".to_string(),
        message: String::new(),
    }
}

fn controller(api_url: String) -> (FormController, Arc<RecordingOpener>) {
    let opener = Arc::new(RecordingOpener::default());
    let controller = FormController::new(api_url, COUPLE, opener.clone())
        .with_timeout(Duration::from_secs(2));
    (controller, opener)
}

#[tokio::test]
async fn saved_reply_reports_whatsapp_status() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rsvp"))
        .and(body_json(json!({
            "name": "Jane Doe",
            "phone": "+27731234567",
            "attendance": "yes",
            "guests": "2",
            "message": ""
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ok": true,
            "rsvpId": "r-1",
            "whatsappSent": false,
            "whatsappError": "Authenticate"
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let (controller, opener) = controller(format!("{}/api/rsvp", backend.uri()));
    let outcome = controller.submit(&jane()).await.unwrap();

    assert_eq!(
        outcome,
        FormOutcome::Saved {
            rsvp_id: Some("r-1".to_string()),
            whatsapp_sent: false,
            whatsapp_error: Some("Authenticate".to_string()),
        }
    );
    assert_eq!(
        outcome.status_message(),
        "Thank you. RSVP saved, but WhatsApp was not sent. Details: Authenticate"
    );
    assert!(opener.opened().is_empty());
    assert!(controller.control().is_enabled());
}

#[tokio::test]
async fn server_error_opens_fallback() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"ok": false, "error": "Could not store RSVP."})),
        )
        .mount(&backend)
        .await;

    let (controller, opener) = controller(format!("{}/api/rsvp", backend.uri()));
    let outcome = controller.submit(&jane()).await.unwrap();

    let FormOutcome::Fallback { link, reason } = &outcome else {
        panic!("expected fallback, got {outcome:?}");
    };
    assert!(reason.contains("Could not store RSVP."));
    assert_eq!(opener.opened(), vec![link.clone()]);
    assert_eq!(
        outcome.status_message(),
        "Server is unavailable. WhatsApp was opened so you can still submit manually."
    );
    assert!(controller.control().is_enabled());
}

#[tokio::test]
async fn ok_false_with_success_status_still_falls_back() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
        .mount(&backend)
        .await;

    let (controller, opener) = controller(format!("{}/api/rsvp", backend.uri()));
    let outcome = controller.submit(&jane()).await.unwrap();
    assert!(!outcome.is_saved());
    assert_eq!(opener.opened().len(), 1);
}

#[tokio::test]
async fn unreachable_backend_opens_prefilled_link() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (controller, opener) = controller(format!("http://{addr}/api/rsvp"));
    let outcome = controller.submit(&jane()).await.unwrap();

    assert!(!outcome.is_saved());
    let opened = opener.opened();
    assert_eq!(opened.len(), 1);
    let link = &opened[0];
    assert!(link.starts_with("https://wa.me/27700000000?text="));
    assert!(link.contains("Name%3A%20Jane%20Doe"));
    assert!(link.contains("Phone%3A%20%2B27731234567"));
    assert!(link.contains("Attendance%3A%20Yes%2C%20attending"));
    assert!(link.contains("Guests%3A%202"));
    assert!(!link.contains("Message"));
}

#[tokio::test]
async fn invalid_input_never_reaches_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend)
        .await;

    let (controller, opener) = controller(format!("{}/api/rsvp", backend.uri()));
    let mut local = jane();
    local.phone = "0731234567".to_string();

    let err = controller.submit(&local).await.unwrap_err();
    assert!(matches!(err, FormError::Invalid(InputError::InvalidPhone)));
    assert!(opener.opened().is_empty());
    assert!(controller.control().is_enabled());
}

#[tokio::test]
async fn second_submit_while_in_flight_is_refused() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"ok": true, "rsvpId": "r-1", "whatsappSent": true}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let (controller, _opener) = controller(format!("{}/api/rsvp", backend.uri()));
    let input = jane();
    let (first, second) = tokio::join!(controller.submit(&input), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(controller.control().label(), "Sending...");
        controller.submit(&input).await
    });

    assert!(first.unwrap().is_saved());
    assert!(matches!(second, Err(FormError::InFlight)));
    assert_eq!(controller.control().label(), "Send RSVP");
}

#[tokio::test]
async fn end_to_end_against_service() {
    let data = TempDir::new().unwrap();
    let state = rsvp_service::AppState::new(
        rsvp_service::store::RsvpStore::open(data.path()),
        Arc::new(rsvp_service::notifier::WhatsAppNotifier::disabled()),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        rsvp_service::http::serve(listener, state, std::future::pending())
            .await
            .unwrap();
    });

    let (controller, opener) = controller(format!("http://{addr}/api/rsvp"));
    let outcome = controller.submit(&jane()).await.unwrap();
    assert_eq!(
        outcome.status_message(),
        "Thank you. RSVP saved, but WhatsApp was not sent."
    );

    let mut too_many = jane();
    too_many.guests = "11".to_string();
    let outcome = controller.submit(&too_many).await.unwrap();
    let FormOutcome::Fallback { reason, .. } = outcome else {
        panic!("expected fallback");
    };
    assert!(reason.contains("Guests must be between 1 and 10."));
    assert_eq!(opener.opened().len(), 1);

    let store = rsvp_service::store::RsvpStore::open(data.path());
    let saved = store.read_all().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "Jane Doe");
    assert_eq!(saved[0].guests, 2);
}
