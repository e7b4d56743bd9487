//! Posts a listing to the configured sled database and races two reservations on it.
//!
//! `REFOOD_DB_PATH=/tmp/refood.db RUST_LOG=debug cargo run --example reserve`
use anyhow::Context;
use refood::{
    config::Config,
    listing::NewListing,
    notify::TracingSink,
    service::{ReservationRequest, ReservationService},
    telemetry,
};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    telemetry::init(&config)?;

    let store = config
        .open_store()
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;
    let service = ReservationService::new(Arc::new(store), Arc::new(TracingSink));

    let listing = service.create_listing(
        NewListing::new()
            .set_title("Bread")
            .set_description("Twenty sourdough loaves from this morning")
            .set_donor_name("Corner Bakery")
            .set_contact_phone("555-0100")
            .set_contact_email("donor@example.com")
            .set_location("12 High Street")
            .set_food_type("Bakery")
            .set_servings(10)
            .set_tags_from_csv("fresh, vegan")
            .set_expiry("2024-12-31"),
    )?;

    let (first, second) = std::thread::scope(|scope| {
        let a = scope.spawn(|| {
            service.reserve(ReservationRequest::new(listing.id().clone(), "FoodBank A"))
        });
        let b = scope.spawn(|| {
            service.reserve(ReservationRequest::new(listing.id().clone(), "FoodBank B"))
        });
        (a.join(), b.join())
    });

    for outcome in [first, second] {
        match outcome {
            Ok(Ok(reservation)) => tracing::info!(
                org = reservation.listing.claim().map(|claim| claim.org_name.as_str()),
                notified = reservation.notified(),
                "won the reservation"
            ),
            Ok(Err(err)) => tracing::info!(error = %err, "lost the reservation"),
            Err(_) => anyhow::bail!("reservation thread panicked"),
        }
    }

    for listing in service.list_listings()? {
        tracing::info!(
            id = %listing.id(),
            title = listing.title(),
            status = ?listing.status(),
            category = ?listing.category(),
            "listing"
        );
    }

    Ok(())
}
