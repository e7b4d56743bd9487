//! Shared fixtures for the integration tests: listing drafts, store setup and sink doubles.
#![allow(dead_code)]

use refood::{
    error::DeliveryError,
    listing::NewListing,
    memory::MemoryListingStore,
    notify::{Notification, NotificationSink},
    service::ReservationService,
    store::SledListingStore,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Sink double that keeps every notification it is handed.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Sink double whose mail server is always down.
#[derive(Default)]
pub struct FailingSink {
    attempts: Mutex<usize>,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl NotificationSink for FailingSink {
    fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap() += 1;
        Err(DeliveryError::new(
            notification.recipient.clone(),
            "smtp connection refused",
        ))
    }
}

pub fn bread() -> NewListing {
    NewListing::new()
        .set_title("Bread")
        .set_description("Sourdough loaves from today's bake")
        .set_donor_name("Corner Bakery")
        .set_contact_phone("555-0100")
        .set_contact_email("donor@example.com")
        .set_location("12 High Street")
        .set_food_type("Bakery")
        .set_servings(10)
        .set_tags_from_csv("fresh, vegan")
        .set_expiry("2024-12-31")
}

pub fn titled(title: &str) -> NewListing {
    bread().set_title(title)
}

// Sled takes a file lock on its directory, so every test gets its own database
// under a temp dir that is removed when the guard drops.
pub fn sled_store(name: &str) -> anyhow::Result<(TempDir, Arc<SledListingStore>)> {
    let temp_dir = tempfile::tempdir()?;
    let db = sled::open(temp_dir.path().join(name))?;
    let store = SledListingStore::new(Arc::new(db))?;
    Ok((temp_dir, Arc::new(store)))
}

pub fn sled_service(
    name: &str,
) -> anyhow::Result<(TempDir, ReservationService, Arc<RecordingSink>)> {
    let (temp_dir, store) = sled_store(name)?;
    let sink = Arc::new(RecordingSink::default());
    let service = ReservationService::new(store, sink.clone());
    Ok((temp_dir, service, sink))
}

pub fn memory_service() -> (ReservationService, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let service = ReservationService::new(Arc::new(MemoryListingStore::new()), sink.clone());
    (service, sink)
}
