//! Listing persistence and the single authority for status transitions
use super::error::StoreError;
use super::listing::{Listing, ListingId, NewListing, TimeStamp};
use sled::{IVec, Tree};
use std::sync::Arc;

const LISTINGS_TREE: &str = "listings";

/// Storage seam for listings.
///
/// Implementations must make `try_reserve` linearizable per listing id: of any
/// number of concurrent calls on the same id, exactly one may observe success.
/// Calls on different ids must not contend on a shared lock.
pub trait ListingStore: Send + Sync {
    /// Validates the draft and stores it as a new `Available` listing.
    fn create(&self, listing: NewListing) -> Result<Listing, StoreError>;

    fn get(&self, id: &ListingId) -> Result<Listing, StoreError>;

    /// Every listing, most recently posted first.
    fn list_all(&self) -> Result<Vec<Listing>, StoreError>;

    /// Atomically moves an `Available` listing to `Reserved` on behalf of `org_name`.
    ///
    /// Fails with `AlreadyReserved` (nothing written) if another reservation won,
    /// or `NotFound` if the id is unknown.
    fn try_reserve(&self, id: &ListingId, org_name: &str) -> Result<Listing, StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Durable store over a sled tree, one CBOR-encoded record per listing keyed by id.
pub struct SledListingStore {
    instance: Arc<sled::Db>,
    listings: Tree,
}

impl SledListingStore {
    pub fn new(instance: Arc<sled::Db>) -> Result<Self, StoreError> {
        let listings = instance.open_tree(LISTINGS_TREE)?;
        Ok(Self {
            instance,
            listings,
        })
    }

    /// Blocks until every write so far is on disk.
    pub fn flush(&self) -> Result<usize, StoreError> {
        Ok(self.instance.flush()?)
    }

    fn load(&self, id: &ListingId) -> Result<(IVec, Listing), StoreError> {
        let raw = self
            .listings
            .get(id.as_str())?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let listing = minicbor::decode(&raw)?;
        Ok((raw, listing))
    }
}

impl ListingStore for SledListingStore {
    fn create(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let listing = listing.finalise(ListingId::generate()?, TimeStamp::new())?;

        self.listings
            .insert(listing.id().as_str(), minicbor::to_vec(&listing)?)?;

        tracing::debug!(id = %listing.id(), title = listing.title(), "listing created");
        Ok(listing)
    }

    fn get(&self, id: &ListingId) -> Result<Listing, StoreError> {
        self.load(id).map(|(_, listing)| listing)
    }

    fn list_all(&self) -> Result<Vec<Listing>, StoreError> {
        let mut listings = self
            .listings
            .iter()
            .map(|entry| -> Result<Listing, StoreError> {
                let (_, raw) = entry?;
                Ok(minicbor::decode(&raw)?)
            })
            .collect::<Result<Vec<Listing>, StoreError>>()?;

        listings.sort_by(Listing::newest_first);
        Ok(listings)
    }

    fn try_reserve(&self, id: &ListingId, org_name: &str) -> Result<Listing, StoreError> {
        loop {
            let (raw, current) = self.load(id)?;
            let reserved = current.reserved_by(org_name, TimeStamp::new())?;

            // the swap only lands if nobody rewrote the record since we read it
            let swapped = self.listings.compare_and_swap(
                id.as_str(),
                Some(&raw),
                Some(minicbor::to_vec(&reserved)?),
            )?;

            match swapped {
                Ok(()) => return Ok(reserved),
                Err(_) => {
                    // lost the swap, the re-read will see the winner's write
                    tracing::trace!(%id, "listing changed during reservation, re-reading");
                }
            }
        }
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.listings.len())
    }
}
