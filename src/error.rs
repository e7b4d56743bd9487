use crate::listing::ListingId;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("servings must be a positive number")]
    ZeroServings,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no listing with id {0}")]
    NotFound(ListingId),
    #[error("listing {0} has already been reserved")]
    AlreadyReserved(ListingId),
    #[error("failed to generate a listing id: {0}")]
    Identifier(#[from] bech32::EncodeError),
    #[error("storage backend failure: {0}")]
    Backend(#[from] sled::Error),
    #[error("failed to encode listing: {0}")]
    Encode(#[from] minicbor::encode::Error<std::convert::Infallible>),
    #[error("failed to decode listing: {0}")]
    Decode(#[from] minicbor::decode::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
    /// A lost race. Terminal for the caller, never worth retrying.
    pub fn is_already_reserved(&self) -> bool {
        matches!(self, StoreError::AlreadyReserved(_))
    }
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

/// Raised by a notification sink. Never rolls back the reservation that triggered it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to deliver notification to {recipient}: {reason}")]
pub struct DeliveryError {
    pub recipient: String,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(recipient: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            reason: reason.into(),
        }
    }
}
