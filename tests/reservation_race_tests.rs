//! Concurrency tests for the reserve transition
//!
//! Many organizations race to reserve the same listing from separate threads.
//! Whatever the interleaving, exactly one must win, every other caller must see
//! `AlreadyReserved`, and the donor must be notified exactly once. Both store
//! backends are exercised since each implements the guarantee differently:
//! sled through compare-and-swap, the memory store through a per-listing lock.
mod common;

use common::{RecordingSink, bread, memory_service, sled_store, titled};
use proptest::prelude::*;
use refood::{
    error::StoreError,
    listing::{ListingId, ListingStatus},
    service::{Reservation, ReservationRequest, ReservationService},
};
use std::sync::{Arc, Barrier};
use std::thread;

/// Release `contenders` threads at once against one listing and collect their outcomes
fn race(
    service: &ReservationService,
    id: &ListingId,
    contenders: usize,
) -> Vec<Result<Reservation, StoreError>> {
    let barrier = Barrier::new(contenders);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..contenders)
            .map(|n| {
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    service.reserve(ReservationRequest::new(id.clone(), format!("Org {n}")))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    })
}

fn assert_single_winner(
    outcomes: &[Result<Reservation, StoreError>],
    sink: &RecordingSink,
) -> Reservation {
    let winners: Vec<&Reservation> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one reservation must succeed");

    let losers = outcomes
        .iter()
        .filter(|o| matches!(o, Err(err) if err.is_already_reserved()))
        .count();
    assert_eq!(losers, outcomes.len() - 1, "every loser must see AlreadyReserved");

    assert_eq!(sink.sent().len(), 1, "the donor is notified once");
    winners[0].clone()
}

#[test]
fn sled_race_has_one_winner() -> anyhow::Result<()> {
    let (_temp_dir, store) = sled_store("sled_race.db")?;
    let sink = Arc::new(RecordingSink::default());
    let service = ReservationService::new(store, sink.clone());
    let listing = service.create_listing(bread())?;

    let outcomes = race(&service, listing.id(), 16);
    let winner = assert_single_winner(&outcomes, &sink);

    let stored = service.get_listing(listing.id())?;
    assert_eq!(stored.status(), ListingStatus::Reserved);
    assert_eq!(stored, winner.listing);
    assert!(sink.sent()[0].body.contains(&stored.claim().unwrap().org_name));

    Ok(())
}

#[test]
fn memory_race_has_one_winner() {
    let (service, sink) = memory_service();
    let listing = service.create_listing(bread()).unwrap();

    let outcomes = race(&service, listing.id(), 16);
    let winner = assert_single_winner(&outcomes, &sink);

    assert_eq!(service.get_listing(listing.id()).unwrap(), winner.listing);
}

#[test]
fn races_on_different_listings_all_succeed() -> anyhow::Result<()> {
    let (_temp_dir, store) = sled_store("distinct_listings.db")?;
    let sink = Arc::new(RecordingSink::default());
    let service = ReservationService::new(store, sink.clone());

    let ids: Vec<ListingId> = (0..8)
        .map(|n| -> anyhow::Result<ListingId> {
            let listing = service.create_listing(titled(&format!("Batch {n}")))?;
            Ok(listing.id().clone())
        })
        .collect::<anyhow::Result<_>>()?;

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let service = &service;
                scope.spawn(move || {
                    service.reserve(ReservationRequest::new(id.clone(), "FoodBank A"))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(sink.sent().len(), ids.len());
    assert!(
        service
            .list_listings()?
            .iter()
            .all(|listing| listing.status() == ListingStatus::Reserved)
    );

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: for any number of contenders N >= 2, one wins and N - 1 lose
    #[test]
    fn prop_race_single_winner(contenders in 2usize..12) {
        let (service, sink) = memory_service();
        let listing = service.create_listing(bread()).unwrap();

        let outcomes = race(&service, listing.id(), contenders);

        prop_assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
        prop_assert_eq!(
            outcomes.iter().filter(|o| matches!(o, Err(err) if err.is_already_reserved())).count(),
            contenders - 1
        );
        prop_assert_eq!(sink.sent().len(), 1);
        prop_assert_eq!(
            service.get_listing(listing.id()).unwrap().status(),
            ListingStatus::Reserved
        );
    }
}
