//! Submission and listing pipelines.
//!
//! One submission moves through
//! `Received → Validated → Persisted → Notified → Responded`, leaving early as
//! `Rejected` (field rule failed) or `StorageFailed` (append failed). The
//! notifier only runs once the record is durably stored, and its outcome is
//! reported next to the stored id instead of replacing it.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use rsvp_protocol::{RsvpRecord, ValidationError, validate_submission};
use serde_json::Value;

use crate::AppState;
use crate::notifier::NotifyOutcome;
use crate::store::{RsvpStore, StoreError};

/// Terminal state of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(ValidationError),
    StorageFailed,
    Created {
        rsvp_id: String,
        notification: NotifyOutcome,
    },
}

/// Run one raw submission body through validation, storage and notification.
pub async fn submit_rsvp(state: &AppState, body: &Value) -> SubmitOutcome {
    let valid = match validate_submission(body) {
        Ok(valid) => valid,
        Err(err) => {
            tracing::warn!("RSVP rejected: {err}");
            return SubmitOutcome::Rejected(err);
        }
    };

    let record = RsvpRecord::from_valid(new_rsvp_id(), Utc::now().trunc_subsecs(3), valid);

    let stored = record.clone();
    if let Err(e) = on_store(&state.store, move |store| store.append(&stored)).await {
        tracing::error!(id = %record.id, "Failed to store RSVP: {e}");
        return SubmitOutcome::StorageFailed;
    }
    tracing::info!(
        id = %record.id,
        attendance = %record.attendance,
        guests = record.guests,
        "RSVP stored"
    );

    let notification = state.notifier.send_confirmation(&record).await;
    match &notification {
        NotifyOutcome::Sent => tracing::info!(id = %record.id, "WhatsApp confirmation sent"),
        NotifyOutcome::NotConfigured => {
            tracing::debug!(id = %record.id, "WhatsApp not configured, confirmation skipped");
        }
        NotifyOutcome::Failed(reason) => {
            tracing::warn!(id = %record.id, phone = %record.phone, "WhatsApp confirmation failed: {reason}");
        }
    }

    SubmitOutcome::Created {
        rsvp_id: record.id,
        notification,
    }
}

/// Every stored RSVP, newest first. Equal timestamps keep their stored order.
pub async fn list_rsvps(store: &Arc<RsvpStore>) -> Result<Vec<RsvpRecord>, StoreError> {
    let mut rows = on_store(store, RsvpStore::read_all).await?;
    rows.sort_by_key(|r| Reverse(r.created_at));
    Ok(rows)
}

/// Run blocking store I/O on the blocking pool so a contended lock never
/// parks an async worker.
async fn on_store<T, F>(store: &Arc<RsvpStore>, op: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&RsvpStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || op(&store)).await {
        Ok(result) => result,
        Err(e) => Err(StoreError::Io(std::io::Error::other(e))),
    }
}

fn new_rsvp_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{Notifier, WhatsAppNotifier};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use pretty_assertions::assert_eq;
    use rsvp_protocol::Attendance;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and reports a fixed outcome.
    struct CountingNotifier {
        calls: AtomicUsize,
        outcome: NotifyOutcome,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        fn is_configured(&self) -> bool {
            true
        }

        async fn send_confirmation(&self, _rsvp: &RsvpRecord) -> NotifyOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn counting(outcome: NotifyOutcome) -> Arc<CountingNotifier> {
        Arc::new(CountingNotifier {
            calls: AtomicUsize::new(0),
            outcome,
        })
    }

    fn scenario_body() -> Value {
        json!({
            "name": "Jane Doe",
            "phone": "+27731234567",
            "attendance": "yes",
            "guests": 2,
            "message": "Can't wait!"
        })
    }

    #[tokio::test]
    async fn valid_submission_is_stored_then_notified() {
        let tmp = tempfile::TempDir::new().unwrap();
        let notifier = counting(NotifyOutcome::Sent);
        let state = AppState::new(RsvpStore::open(tmp.path()), notifier.clone());

        let outcome = submit_rsvp(&state, &scenario_body()).await;
        let SubmitOutcome::Created {
            rsvp_id,
            notification,
        } = outcome
        else {
            panic!("expected Created, got {outcome:?}");
        };
        assert_eq!(notification, NotifyOutcome::Sent);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);

        let stored = state.store.read_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, rsvp_id);
        assert_eq!(stored[0].name, "Jane Doe");
        assert_eq!(stored[0].attendance, Attendance::Yes);
        assert_eq!(stored[0].message, "Can't wait!");
    }

    #[tokio::test]
    async fn local_number_without_country_code_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let notifier = counting(NotifyOutcome::Sent);
        let state = AppState::new(RsvpStore::open(tmp.path()), notifier.clone());

        let mut body = scenario_body();
        body["phone"] = json!("0731234567");
        let outcome = submit_rsvp(&state, &body).await;

        assert_eq!(outcome, SubmitOutcome::Rejected(ValidationError::PhoneFormat));
        assert!(state.store.read_all().unwrap().is_empty());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn storage_failure_skips_notification() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("data");
        std::fs::write(&blocker, "").unwrap();
        let notifier = counting(NotifyOutcome::Sent);
        let state = AppState::new(RsvpStore::open(&blocker), notifier.clone());

        let outcome = submit_rsvp(&state, &scenario_body()).await;

        assert_eq!(outcome, SubmitOutcome::StorageFailed);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn notifier_failure_keeps_the_record() {
        let tmp = tempfile::TempDir::new().unwrap();
        let notifier = counting(NotifyOutcome::Failed("rate limited".to_string()));
        let state = AppState::new(RsvpStore::open(tmp.path()), notifier);

        let outcome = submit_rsvp(&state, &scenario_body()).await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Created {
                notification: NotifyOutcome::Failed(ref reason),
                ..
            } if reason == "rate limited"
        ));
        assert_eq!(state.store.read_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unconfigured_notifier_still_creates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = AppState::new(
            RsvpStore::open(tmp.path()),
            Arc::new(WhatsAppNotifier::disabled()),
        );

        let outcome = submit_rsvp(&state, &scenario_body()).await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Created {
                notification: NotifyOutcome::NotConfigured,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = AppState::new(
            RsvpStore::open(tmp.path()),
            Arc::new(WhatsAppNotifier::disabled()),
        );

        for _ in 0..20 {
            submit_rsvp(&state, &scenario_body()).await;
        }
        let mut ids: Vec<String> = state
            .store
            .read_all()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_stable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = Arc::new(RsvpStore::open(tmp.path()));
        let base = DateTime::parse_from_rfc3339("2026-02-09T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        // (id, minutes after base), stored in this order.
        let rows = [("a", 5), ("b", 10), ("c", 5), ("d", 0), ("e", 10)];
        for (id, minutes) in rows {
            store
                .append(&RsvpRecord {
                    id: id.to_string(),
                    created_at: base + Duration::minutes(minutes),
                    name: "Guest".to_string(),
                    phone: "+27731234567".to_string(),
                    attendance: Attendance::No,
                    guests: 1,
                    message: String::new(),
                })
                .unwrap();
        }

        let ids: Vec<String> = list_rsvps(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "e", "a", "c", "d"]);
    }

    #[tokio::test(flavor = "current_thread")]
    #[allow(clippy::await_holding_lock)]
    async fn store_waits_do_not_stall_the_runtime() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = AppState::new(RsvpStore::open(tmp.path()), counting(NotifyOutcome::Sent));

        // Hold the store lock on the only runtime thread.
        let guard = state.store.lock();
        let listing = tokio::spawn({
            let store = Arc::clone(&state.store);
            async move { list_rsvps(&store).await }
        });
        let submitting = tokio::spawn({
            let state = state.clone();
            async move { submit_rsvp(&state, &scenario_body()).await }
        });

        // Timers still fire while both pipelines wait on the lock.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!listing.is_finished());
        assert!(!submitting.is_finished());

        drop(guard);
        assert!(matches!(
            submitting.await.unwrap(),
            SubmitOutcome::Created { .. }
        ));
        assert!(listing.await.unwrap().unwrap().len() <= 1);
    }
}
