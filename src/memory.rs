//! In-memory listing store with one lock per listing
use super::error::StoreError;
use super::listing::{Listing, ListingId, NewListing, TimeStamp};
use super::store::ListingStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Listings kept in process memory.
///
/// The map lock is held only long enough to find a listing; the transition itself
/// runs under that listing's own mutex, so reservations on different listings
/// never wait on each other.
#[derive(Default)]
pub struct MemoryListingStore {
    listings: RwLock<HashMap<ListingId, Arc<Mutex<Listing>>>>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: &ListingId) -> Result<Arc<Mutex<Listing>>, StoreError> {
        let listings = self.listings.read().unwrap_or_else(PoisonError::into_inner);
        listings
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

// A listing is only ever replaced wholesale under its lock, so a poisoned guard
// still holds a consistent record.
impl ListingStore for MemoryListingStore {
    fn create(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let listing = listing.finalise(ListingId::generate()?, TimeStamp::new())?;

        self.listings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(listing.id().clone(), Arc::new(Mutex::new(listing.clone())));

        tracing::debug!(id = %listing.id(), title = listing.title(), "listing created");
        Ok(listing)
    }

    fn get(&self, id: &ListingId) -> Result<Listing, StoreError> {
        let entry = self.entry(id)?;
        let listing = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(listing.clone())
    }

    fn list_all(&self) -> Result<Vec<Listing>, StoreError> {
        let entries: Vec<_> = self
            .listings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut listings: Vec<Listing> = entries
            .iter()
            .map(|entry| entry.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .collect();

        listings.sort_by(Listing::newest_first);
        Ok(listings)
    }

    fn try_reserve(&self, id: &ListingId, org_name: &str) -> Result<Listing, StoreError> {
        let entry = self.entry(id)?;
        let mut listing = entry.lock().unwrap_or_else(PoisonError::into_inner);

        let reserved = listing.reserved_by(org_name, TimeStamp::new())?;
        *listing = reserved.clone();
        Ok(reserved)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self
            .listings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len())
    }
}
