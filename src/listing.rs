//! Food listings, their lifecycle status, and the draft builder used to post them
use super::error::{StoreError, ValidationError};
use super::utils;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

// compared by instant, independent of the offset type
impl<T: TimeZone> PartialEq for TimeStamp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: TimeZone> Eq for TimeStamp<T> {}

impl<T: TimeZone> PartialOrd for TimeStamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TimeZone> Ord for TimeStamp<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    /// `None` when the fields do not name a real UTC instant (e.g. February 30th).
    pub fn new_with(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self::from)
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

// seconds and sub-second nanos, so every instant chrono can represent survives storage
impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(2)?
            .i64(self.0.timestamp())?
            .u32(self.0.timestamp_subsec_nanos())?
            .ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        if d.array()? != Some(2) {
            return Err(minicbor::decode::Error::message(
                "expected timestamp as [seconds, nanos]",
            ));
        }
        let secs = d.i64()?;
        let nsecs = d.u32()?;

        DateTime::from_timestamp(secs, nsecs)
            .map(TimeStamp)
            .ok_or(minicbor::decode::Error::message(
                "failed to convert timestamp to utc",
            ))
    }
}

/// Opaque listing identifier. Generated ids are bech32m-encoded uuid7s, but any
/// caller-supplied string is accepted for lookups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListingId(String);

impl ListingId {
    pub(crate) fn generate() -> Result<Self, StoreError> {
        Ok(Self(utils::new_listing_id()?))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ListingId {
    fn from(value: String) -> Self {
        ListingId(value)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        ListingId(value.to_owned())
    }
}

impl<C> minicbor::Encode<C> for ListingId {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.str(&self.0)?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for ListingId {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        Ok(ListingId(d.str()?.to_owned()))
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    #[n(0)]
    Available,
    #[n(1)]
    Reserved,
}

/// Last usable moment of a listing. Donors either give a date or describe it ("tonight").
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    #[n(0)]
    At(#[n(0)] TimeStamp<Utc>),
    #[n(1)]
    Described(#[n(0)] String),
}

impl Expiry {
    /// Parses RFC 3339 timestamps and `YYYY-MM-DD` dates; other text is kept as a description.
    /// Returns `None` for blank input.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(text) {
            return Some(Expiry::At(at.with_timezone(&Utc).into()));
        }
        // a bare date is usable until the end of that day
        if let Some(at) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(23, 59, 59))
        {
            return Some(Expiry::At(at.and_utc().into()));
        }
        Some(Expiry::Described(text.to_owned()))
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::At(at) => write!(f, "{}", at.to_datetime_utc().to_rfc3339()),
            Expiry::Described(text) => f.write_str(text),
        }
    }
}

/// Display category derived from the free-text food type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodCategory {
    Vegetarian,
    Bakery,
    Other,
}

impl FoodCategory {
    pub fn from_food_type(food_type: &str) -> Self {
        let food_type = food_type.to_lowercase();
        if food_type.contains("veg") {
            FoodCategory::Vegetarian
        } else if food_type.contains("bakery") {
            FoodCategory::Bakery
        } else {
            FoodCategory::Other
        }
    }
    pub fn image_url(&self) -> &'static str {
        match self {
            FoodCategory::Vegetarian => {
                "https://images.unsplash.com/photo-1512621776951-a57141f2eefd?w=500"
            }
            FoodCategory::Bakery => {
                "https://images.unsplash.com/photo-1509440159596-0249088772ff?w=500"
            }
            FoodCategory::Other => {
                "https://images.unsplash.com/photo-1565557623262-b51c2513a641?w=500"
            }
        }
    }
}

/// Who reserved a listing, and when.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    #[n(0)]
    pub org_name: String,
    #[n(1)]
    pub reserved_at: TimeStamp<Utc>,
}

/// A posted listing as owned by a store. Callers only ever hold snapshots.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    #[n(0)]
    id: ListingId,
    #[n(1)]
    title: String,
    #[n(2)]
    description: String,
    #[n(3)]
    donor_name: String,
    #[n(4)]
    contact_phone: String,
    #[n(5)]
    contact_email: String,
    #[n(6)]
    location: String,
    #[n(7)]
    food_type: String,
    #[n(8)]
    servings: u32,
    #[n(9)]
    tags: BTreeSet<String>,
    #[n(10)]
    expiry: Expiry,
    #[n(11)]
    status: ListingStatus,
    #[n(12)]
    posted_at: TimeStamp<Utc>,
    #[n(13)]
    claim: Option<Claim>, // set together with status
}

impl Listing {
    pub fn id(&self) -> &ListingId {
        &self.id
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn donor_name(&self) -> &str {
        &self.donor_name
    }
    pub fn contact_phone(&self) -> &str {
        &self.contact_phone
    }
    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }
    pub fn location(&self) -> &str {
        &self.location
    }
    pub fn food_type(&self) -> &str {
        &self.food_type
    }
    pub fn servings(&self) -> u32 {
        self.servings
    }
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
    pub fn expiry(&self) -> &Expiry {
        &self.expiry
    }
    pub fn status(&self) -> ListingStatus {
        self.status
    }
    pub fn posted_at(&self) -> &TimeStamp<Utc> {
        &self.posted_at
    }
    pub fn claim(&self) -> Option<&Claim> {
        self.claim.as_ref()
    }
    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Available
    }
    pub fn category(&self) -> FoodCategory {
        FoodCategory::from_food_type(&self.food_type)
    }

    /// The `Available -> Reserved` transition on a snapshot. Stores call this while
    /// holding their per-listing guarantee and persist the result as one update.
    pub(crate) fn reserved_by(
        &self,
        org_name: &str,
        at: TimeStamp<Utc>,
    ) -> Result<Self, StoreError> {
        if self.status == ListingStatus::Reserved {
            return Err(StoreError::AlreadyReserved(self.id.clone()));
        }

        let mut reserved = self.clone();
        reserved.status = ListingStatus::Reserved;
        reserved.claim = Some(Claim {
            org_name: org_name.to_owned(),
            reserved_at: at,
        });
        Ok(reserved)
    }

    /// Most recently posted first, ties broken by descending id.
    pub fn newest_first(a: &Listing, b: &Listing) -> Ordering {
        b.posted_at
            .cmp(&a.posted_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Draft of a listing as submitted by a donor. Nothing is checked until `finalise`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NewListing {
    title: String,
    description: String,
    donor_name: String,
    contact_phone: String,
    contact_email: String,
    location: String,
    food_type: String,
    servings: u32,
    tags: BTreeSet<String>,
    expiry: String,
}

impl NewListing {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
    pub fn set_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
    pub fn set_donor_name(mut self, donor_name: impl Into<String>) -> Self {
        self.donor_name = donor_name.into();
        self
    }
    pub fn set_contact_phone(mut self, phone: impl Into<String>) -> Self {
        self.contact_phone = phone.into();
        self
    }
    pub fn set_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = email.into();
        self
    }
    pub fn set_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
    pub fn set_food_type(mut self, food_type: impl Into<String>) -> Self {
        self.food_type = food_type.into();
        self
    }
    pub fn set_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }
    pub fn set_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect();
        self
    }
    /// Accepts the comma separated form donors type in, e.g. `"halal, fresh"`.
    pub fn set_tags_from_csv(self, tags: &str) -> Self {
        self.set_tags(tags.split(','))
    }
    pub fn set_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = expiry.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("donor_name", &self.donor_name),
            ("contact_phone", &self.contact_phone),
            ("contact_email", &self.contact_email),
            ("location", &self.location),
            ("food_type", &self.food_type),
            ("expiry", &self.expiry),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ValidationError::EmptyField(*field));
        }
        if self.servings == 0 {
            return Err(ValidationError::ZeroServings);
        }
        Ok(())
    }

    // Checks fields, then stamps the draft with its store-assigned identity
    pub(crate) fn finalise(
        self,
        id: ListingId,
        posted_at: TimeStamp<Utc>,
    ) -> Result<Listing, ValidationError> {
        self.validate()?;
        let expiry = Expiry::parse(&self.expiry).ok_or(ValidationError::EmptyField("expiry"))?;

        Ok(Listing {
            id,
            title: self.title,
            description: self.description,
            donor_name: self.donor_name,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            location: self.location,
            food_type: self.food_type,
            servings: self.servings,
            tags: self.tags,
            expiry,
            status: ListingStatus::Available,
            posted_at,
            claim: None,
        })
    }
}
