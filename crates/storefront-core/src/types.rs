//! # Domain Types
//!
//! Shared domain types used throughout the storefront engine.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │ FulfillmentType │   │  Coordinates    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sku            │   │  Pickup         │   │  lat (deg)      │       │
//! │  │  name           │   │  Delivery       │   │  lon (deg)      │       │
//! │  │  unit_price     │   └─────────────────┘   └─────────────────┘       │
//! │  │  price_unit     │                                                    │
//! │  └─────────────────┘   ┌─────────────────┐                              │
//! │                        │ CustomerHistory │                              │
//! │                        │  ─────────────  │                              │
//! │                        │  prior orders   │                              │
//! │                        │  redeemed codes │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::promo::normalize_code;
use crate::units::PriceUnit;

// =============================================================================
// Catalog Item
// =============================================================================

/// A menu entry as the catalog presents it at add-to-cart time.
///
/// The cart copies these fields into the line, so later catalog edits do
/// not reprice an item already in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Price per `price_unit`, in cents.
    pub unit_price_cents: i64,

    /// Unit the price is quoted in.
    #[serde(default)]
    pub price_unit: PriceUnit,

    /// Image reference for the cart thumbnail.
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl CatalogItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Fulfillment
// =============================================================================

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentType {
    #[default]
    Pickup,
    Delivery,
}

impl FulfillmentType {
    #[inline]
    pub const fn is_delivery(&self) -> bool {
        matches!(self, FulfillmentType::Delivery)
    }
}

// =============================================================================
// Coordinates
// =============================================================================

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Coordinates { lat, lon }
    }

    /// Latitude within ±90 and longitude within ±180.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

// =============================================================================
// Customer History
// =============================================================================

/// What the promo validator needs to know about the customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerHistory {
    /// Number of completed (not cancelled) orders.
    pub completed_orders: u32,

    /// Upper-cased codes this customer has redeemed, with the number of
    /// live orders that redeemed each one.
    #[serde(default)]
    pub redeemed_codes: BTreeMap<String, u32>,
}

impl CustomerHistory {
    /// A guest or brand-new customer.
    pub fn first_time() -> Self {
        Self::default()
    }

    pub fn is_first_time(&self) -> bool {
        self.completed_orders == 0
    }

    /// Case-insensitive redemption check.
    pub fn has_redeemed(&self, code: &str) -> bool {
        self.redeemed_codes.contains_key(&normalize_code(code))
    }

    /// Records a completed order and the code it redeemed, if any.
    pub fn record_order(&mut self, promo_code: Option<&str>) {
        self.completed_orders += 1;
        if let Some(code) = promo_code {
            *self.redeemed_codes.entry(normalize_code(code)).or_insert(0) += 1;
        }
    }

    /// Reverses [`record_order`](Self::record_order) for a cancelled order.
    ///
    /// A code stays redeemed while any other order still carries it.
    pub fn forget_order(&mut self, promo_code: Option<&str>) {
        self.completed_orders = self.completed_orders.saturating_sub(1);
        if let Some(code) = promo_code {
            let code = normalize_code(code);
            if let Some(count) = self.redeemed_codes.get_mut(&code) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.redeemed_codes.remove(&code);
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
