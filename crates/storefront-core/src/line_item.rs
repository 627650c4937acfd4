//! # Line Item Valuation
//!
//! One cart line and what it contributes to the subtotal.
//!
//! ## Line Total
//! ```text
//! (unit_price + Σ modifier.price) × qty  ──round──►  line_total (cents)
//!
//! Latte $4.50  + oat milk $0.75 + extra shot $1.00  × 2  = $12.50
//! Salmon $9.99/lb (no modifiers)                    × 1.5 lb = $14.99
//! ```
//!
//! A modifier price is a fixed delta on the unit price. It is not scaled
//! separately by the unit, only multiplied by the quantity along with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::types::CatalogItem;
use crate::units::{PriceUnit, Quantity};

/// An add-on or variant choice attached to a line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub name: String,

    /// Price delta in cents. Zero-price modifiers are still listed.
    #[serde(default)]
    pub price_cents: i64,
}

impl Modifier {
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        Modifier {
            name: name.into(),
            price_cents,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// One distinct product entry in the cart.
///
/// ## Snapshot Pattern
/// `sku`, `name`, `unit_price_cents` and `price_unit` are frozen from the
/// catalog when the line is created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line id (UUID v4).
    pub id: String,

    pub sku: String,

    pub name: String,

    /// Price per `price_unit`, in cents (frozen).
    pub unit_price_cents: i64,

    pub price_unit: PriceUnit,

    /// Always `>= price_unit.minimum()` and on a step boundary.
    #[ts(type = "string")]
    pub qty: Quantity,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub note: Option<String>,

    #[serde(default)]
    pub image_ref: Option<String>,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a line from a catalog entry. `qty` is clamped to the unit.
    pub fn from_catalog(
        item: &CatalogItem,
        qty: Quantity,
        modifiers: Vec<Modifier>,
        note: Option<String>,
    ) -> Self {
        CartItem {
            id: Uuid::new_v4().to_string(),
            sku: item.sku.clone(),
            name: item.name.clone(),
            unit_price_cents: item.unit_price_cents,
            price_unit: item.price_unit,
            qty: item.price_unit.clamp(qty),
            modifiers,
            note: normalize_note(note),
            image_ref: item.image_ref.clone(),
            added_at: Utc::now(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Sum of modifier deltas.
    pub fn modifiers_total(&self) -> Money {
        self.modifiers.iter().map(Modifier::price).sum()
    }

    /// Unit price with modifiers applied.
    pub fn effective_unit_price(&self) -> Money {
        self.unit_price() + self.modifiers_total()
    }

    /// `(unit_price + Σ modifiers) × qty`, rounded to the nearest cent.
    pub fn line_total(&self) -> Money {
        line_total(self)
    }

    /// Human-readable quantity, e.g. `"1.50 lb"`.
    pub fn display_quantity(&self) -> String {
        self.price_unit.format(self.qty)
    }

    /// True when `other` describes the same product configuration, so an
    /// add-to-cart should merge into this line.
    pub(crate) fn same_configuration(
        &self,
        item: &CatalogItem,
        modifiers: &[Modifier],
        note: &Option<String>,
    ) -> bool {
        self.sku == item.sku
            && self.unit_price_cents == item.unit_price_cents
            && self.price_unit == item.price_unit
            && self.modifiers.as_slice() == modifiers
            && &self.note == note
    }
}

/// A line's contribution to the subtotal. Pure.
pub fn line_total(item: &CartItem) -> Money {
    item.effective_unit_price().times_quantity(item.qty)
}

/// Trims a note and drops it when empty.
pub(crate) fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
