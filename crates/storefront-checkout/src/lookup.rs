//! # Lookup Backends
//!
//! The two suspension points in pricing: turning an address into
//! coordinates, and turning a promo code into its record.
//!
//! ```text
//! ┌──────────────────┐     geocode(address)      ┌──────────────────────┐
//! │ CheckoutSession  │ ────────────────────────► │ impl Geocoder        │
//! │                  │ ◄──────────────────────── │  Option<Coordinates> │
//! │                  │                           └──────────────────────┘
//! │                  │     find(code)            ┌──────────────────────┐
//! │                  │ ────────────────────────► │ impl PromoDirectory  │
//! │                  │ ◄──────────────────────── │  Option<Promo>       │
//! └──────────────────┘                           └──────────────────────┘
//! ```
//!
//! `Ok(None)` means the backend answered and found nothing. Transport
//! failures are [`LookupError`]s, and only the retryable ones are retried.

use std::collections::HashMap;
use std::future::Future;

use storefront_core::{Coordinates, Promo, PromoBook};

use crate::error::LookupResult;

// =============================================================================
// Traits
// =============================================================================

/// Resolves a free-text delivery address.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> impl Future<Output = LookupResult<Option<Coordinates>>> + Send;
}

/// Fetches promo records by code.
pub trait PromoDirectory: Send + Sync {
    fn find(&self, code: &str) -> impl Future<Output = LookupResult<Option<Promo>>> + Send;
}

// =============================================================================
// Static Geocoder
// =============================================================================

/// A fixed address book. Used by the CLI and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    addresses: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: &str, coords: Coordinates) -> Self {
        self.insert(address, coords);
        self
    }

    pub fn insert(&mut self, address: &str, coords: Coordinates) {
        self.addresses.insert(address_key(address), coords);
    }
}

/// Case and whitespace insensitive key.
fn address_key(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> LookupResult<Option<Coordinates>> {
        Ok(self.addresses.get(&address_key(address)).copied())
    }
}

// =============================================================================
// Static Promo Directory
// =============================================================================

/// Serves promos from an in-memory [`PromoBook`].
#[derive(Debug, Clone, Default)]
pub struct StaticPromoDirectory {
    book: PromoBook,
}

impl StaticPromoDirectory {
    pub fn new(promos: impl IntoIterator<Item = Promo>) -> Self {
        StaticPromoDirectory {
            book: PromoBook::new(promos),
        }
    }

    pub fn len(&self) -> usize {
        self.book.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }
}

impl PromoDirectory for StaticPromoDirectory {
    async fn find(&self, code: &str) -> LookupResult<Option<Promo>> {
        Ok(self.book.find(code).cloned())
    }
}
