//! Reservation notifications and the sink they are delivered through
use super::error::DeliveryError;
use super::listing::Listing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Confirmation sent to the donor once `org_name` has reserved their listing.
    pub fn reservation_confirmed(listing: &Listing, org_name: &str) -> Self {
        Self::new(
            listing.contact_email(),
            format!("Food Reserved: {}", listing.title()),
            format!(
                "Hi {}, your food '{}' has been reserved by {}.",
                listing.donor_name(),
                listing.title(),
                org_name
            ),
        )
    }
}

/// Where reservation confirmations go. Delivery is best-effort: a failure is
/// reported back but never undoes the reservation.
pub trait NotificationSink: Send + Sync {
    fn send(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Emits each notification as a structured log event instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        tracing::info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            body = %notification.body,
            "email notification"
        );
        Ok(())
    }
}
