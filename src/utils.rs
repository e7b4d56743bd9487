//! Utility functions for identifier generation

use bech32::{Bech32m, Hrp};
use uuid7::uuid7;

pub const LISTING_HRP: &str = "listing_";

// construct a time-ordered unique id then encode using bech32m.
// the listing prefix is a known-good hrp, so only the encoding itself can fail
pub fn new_listing_id() -> Result<String, bech32::EncodeError> {
    let hrp = Hrp::parse_unchecked(LISTING_HRP);
    bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
}
