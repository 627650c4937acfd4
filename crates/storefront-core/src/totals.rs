//! # Totals Aggregator
//!
//! Composes line items, tax, fees, tip and discount into one authoritative
//! total.
//!
//! ## Evaluation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. subtotal     = Σ line_total(item)                                   │
//! │  2. discount     = promo.discount_at(subtotal)       (≤ subtotal)       │
//! │  3. tax          = round((subtotal - discount) × tax_rate)              │
//! │  4. delivery_fee = zone.fee            if Delivery, else 0              │
//! │  5. tips         = resolve_tip(selection, subtotal).capped              │
//! │  6. grand_total  = subtotal - discount + tax + fees + delivery + tips   │
//! │                                                                         │
//! │  Each stage reads the gross subtotal, never a tax- or tip-inclusive     │
//! │  amount. Every rate multiplication is rounded to a cent on the spot.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `fees` is the store's flat service fee. It is charged only on non-empty
//! carts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::PromoError;
use crate::line_item::{line_total, CartItem};
use crate::money::{Money, Rate};
use crate::promo::AppliedPromo;
use crate::tip::{resolve_tip, TipCapWarning, TipPolicy, TipResult, TipSelection};
use crate::types::FulfillmentType;
use crate::zone::{DeliveryZone, MinimumOrderShortfall};

// =============================================================================
// Pricing Policy
// =============================================================================

/// Store-wide pricing parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    pub tax_rate: Rate,

    /// Flat per-order service fee.
    #[serde(default)]
    pub service_fee: Money,

    #[serde(default)]
    pub tip: TipPolicy,
}

// =============================================================================
// Cart Totals
// =============================================================================

/// The authoritative money breakdown, all in integer cents.
///
/// `grand_total = subtotal - discount + tax + fees + delivery_fee + tips`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub fees: Money,
    pub delivery_fee: Money,
    pub tips: Money,
    pub discount: Money,
    pub grand_total: Money,
}

impl CartTotals {
    /// Recomputes the grand total from the components.
    pub fn expected_grand_total(&self) -> Money {
        self.subtotal - self.discount + self.tax + self.fees + self.delivery_fee + self.tips
    }
}

/// What happened to the applied promo at pricing time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PromoStatus {
    /// No code applied.
    #[default]
    None,

    Applied { code: String, discount: Money },

    /// The cart dropped below the promo minimum after the code was applied.
    /// The code stays on the cart; the discount is 0 until the cart grows.
    BelowMinimum {
        code: String,
        minimum: Money,
        deficit: Money,
    },

    Rejected { code: String, reason: String },
}

impl PromoStatus {
    fn from_error(err: PromoError) -> Self {
        match err {
            PromoError::BelowMinimum {
                code,
                minimum,
                deficit,
            } => PromoStatus::BelowMinimum {
                code,
                minimum,
                deficit,
            },
            other => PromoStatus::Rejected {
                code: other.code().to_string(),
                reason: other.reason().to_string(),
            },
        }
    }
}

/// Totals plus the intermediate results the UI needs to explain them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub totals: CartTotals,
    pub tip: TipResult,
    pub promo: PromoStatus,
}

// =============================================================================
// Computation
// =============================================================================

/// Step 1: sum of line totals.
pub fn subtotal(items: &[CartItem]) -> Money {
    items.iter().map(line_total).sum()
}

/// Runs the fixed evaluation order and keeps the intermediate results.
pub fn price(
    items: &[CartItem],
    policy: &PricingPolicy,
    tip: &TipSelection,
    promo: Option<&AppliedPromo>,
    zone: Option<&DeliveryZone>,
    fulfillment: FulfillmentType,
) -> PriceBreakdown {
    let subtotal = subtotal(items);

    let (discount, promo_status) = match promo {
        None => (Money::zero(), PromoStatus::None),
        Some(applied) => match applied.discount_at(subtotal) {
            Ok(discount) => (
                discount,
                PromoStatus::Applied {
                    code: applied.code.clone(),
                    discount,
                },
            ),
            Err(err) => (Money::zero(), PromoStatus::from_error(err)),
        },
    };
    debug_assert!(discount <= subtotal, "discount {discount} exceeds subtotal {subtotal}");
    let discount = discount.min(subtotal).floor_zero();

    let tax = (subtotal - discount).apply_rate(policy.tax_rate);

    let delivery_fee = match (fulfillment, zone) {
        (FulfillmentType::Delivery, Some(zone)) => zone.fee(),
        _ => Money::zero(),
    };

    let fees = if items.is_empty() {
        Money::zero()
    } else {
        policy.service_fee
    };

    let tip_result = resolve_tip(tip, subtotal, fulfillment, &policy.tip);
    let tips = tip_result.capped_tip_cents;

    let raw_total = subtotal - discount + tax + fees + delivery_fee + tips;
    debug_assert!(!raw_total.is_negative(), "grand total went negative: {raw_total}");

    PriceBreakdown {
        totals: CartTotals {
            subtotal,
            tax,
            fees,
            delivery_fee,
            tips,
            discount,
            grand_total: raw_total.floor_zero(),
        },
        tip: tip_result,
        promo: promo_status,
    }
}

/// Computes the cart totals. Pure; identical inputs give identical output.
///
/// ```rust
/// use storefront_core::line_item::CartItem;
/// use storefront_core::money::Rate;
/// use storefront_core::tip::TipSelection;
/// use storefront_core::totals::{compute_totals, PricingPolicy};
/// use storefront_core::types::{CatalogItem, FulfillmentType};
/// use storefront_core::units::{PriceUnit, Quantity};
///
/// let burger = CatalogItem {
///     sku: "BURGER".into(),
///     name: "Burger".into(),
///     unit_price_cents: 1200,
///     price_unit: PriceUnit::Each,
///     image_ref: None,
/// };
/// let items = vec![CartItem::from_catalog(&burger, Quantity::whole(2), vec![], None)];
/// let policy = PricingPolicy { tax_rate: Rate::from_percent(8), ..Default::default() };
///
/// let totals = compute_totals(
///     &items,
///     &policy,
///     &TipSelection::no_tip(),
///     None,
///     None,
///     FulfillmentType::Pickup,
/// );
/// assert_eq!(totals.grand_total.cents(), 2592);
/// ```
pub fn compute_totals(
    items: &[CartItem],
    policy: &PricingPolicy,
    tip: &TipSelection,
    promo: Option<&AppliedPromo>,
    zone: Option<&DeliveryZone>,
    fulfillment: FulfillmentType,
) -> CartTotals {
    price(items, policy, tip, promo, zone, fulfillment).totals
}

// =============================================================================
// Quote
// =============================================================================

/// Why checkout is currently blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CheckoutBlocker {
    EmptyCart,

    /// Delivery selected but no zone has been resolved.
    NoDeliveryZone,

    BelowMinimumOrder { minimum: Money, deficit: Money },
}

impl CheckoutBlocker {
    pub fn user_message(&self) -> String {
        match self {
            CheckoutBlocker::EmptyCart => "Your cart is empty.".to_string(),
            CheckoutBlocker::NoDeliveryZone => {
                "Enter a delivery address or choose pickup.".to_string()
            }
            CheckoutBlocker::BelowMinimumOrder { minimum, deficit } => MinimumOrderShortfall {
                minimum: *minimum,
                deficit: *deficit,
            }
            .user_message(),
        }
    }
}

/// A full pricing snapshot of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub totals: CartTotals,
    pub tip: TipResult,
    pub tip_warning: Option<TipCapWarning>,
    pub promo: PromoStatus,
    pub delivery_zone: Option<DeliveryZone>,
    pub minimum_order: Option<MinimumOrderShortfall>,
    pub blockers: Vec<CheckoutBlocker>,
    pub line_count: usize,
    pub quoted_at: DateTime<Utc>,
}

impl Quote {
    pub fn can_checkout(&self) -> bool {
        self.blockers.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
