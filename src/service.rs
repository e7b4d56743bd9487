//! Service layer API for listing and reservation operations
use super::error::{DeliveryError, StoreError, ValidationError};
use super::listing::{Listing, ListingId, NewListing};
use super::notify::{Notification, NotificationSink};
use super::store::ListingStore;
use std::sync::Arc;

/// An organization's request to collect a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub listing_id: ListingId,
    pub reserving_org_name: String,
}

impl ReservationRequest {
    pub fn new(listing_id: impl Into<ListingId>, reserving_org_name: impl Into<String>) -> Self {
        Self {
            listing_id: listing_id.into(),
            reserving_org_name: reserving_org_name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listing_id.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyField("listing_id"));
        }
        if self.reserving_org_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("reserving_org_name"));
        }
        Ok(())
    }
}

/// A committed reservation. `warning` carries a failed confirmation delivery;
/// the listing is reserved either way.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub listing: Listing,
    pub warning: Option<DeliveryError>,
}

impl Reservation {
    pub fn notified(&self) -> bool {
        self.warning.is_none()
    }
}

pub struct ReservationService {
    store: Arc<dyn ListingStore>,
    sink: Arc<dyn NotificationSink>,
}

impl ReservationService {
    pub fn new(store: Arc<dyn ListingStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { store, sink }
    }

    /// Post a new listing
    pub fn create_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        self.store.create(listing)
    }

    /// All listings, most recently posted first
    pub fn list_listings(&self) -> Result<Vec<Listing>, StoreError> {
        self.store.list_all()
    }

    pub fn get_listing(&self, id: &ListingId) -> Result<Listing, StoreError> {
        self.store.get(id)
    }

    /// Reserve an available listing and notify its donor.
    ///
    /// `NotFound` and `AlreadyReserved` come straight from the store; a lost race
    /// is a final answer and is not retried here.
    pub fn reserve(&self, request: ReservationRequest) -> Result<Reservation, StoreError> {
        request.validate()?;
        let org_name = request.reserving_org_name.trim();

        let listing = match self.store.try_reserve(&request.listing_id, org_name) {
            Ok(listing) => listing,
            Err(err) => {
                if err.is_already_reserved() {
                    tracing::warn!(id = %request.listing_id, org = org_name, "listing already reserved");
                }
                return Err(err);
            }
        };
        tracing::info!(id = %listing.id(), org = org_name, "listing reserved");

        // the transition is committed; delivery problems only downgrade to a warning
        let notification = Notification::reservation_confirmed(&listing, org_name);
        let warning = match self.sink.send(&notification) {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(id = %listing.id(), error = %err, "reservation notification failed");
                Some(err)
            }
        };

        Ok(Reservation { listing, warning })
    }
}
