//! `rsvp-service`: wedding RSVP backend.
//!
//! Accepts RSVPs over HTTP, appends them to a JSON log on disk, and sends
//! the guest a WhatsApp confirmation when the channel is configured.
//!
//! - [`config`]: environment-driven settings, loaded once at startup
//! - [`store`]: append-only RSVP log
//! - [`notifier`]: WhatsApp confirmations, reported as data
//! - [`submission`]: the submit and list pipelines
//! - [`http`]: the `/api/*` router

pub mod config;
pub mod http;
pub mod notifier;
pub mod store;
pub mod submission;

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::notifier::{Notifier, WhatsAppNotifier};
use crate::store::RsvpStore;

/// Shared handles for request handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RsvpStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(store: RsvpStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: Arc::new(store),
            notifier,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let notifier = WhatsAppNotifier::new(config.whatsapp.clone(), config.signature.clone());
        Self::new(RsvpStore::open(&config.data_dir), Arc::new(notifier))
    }
}
