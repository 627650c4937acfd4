//! # storefront-core: Pure Pricing Engine for the Storefront
//!
//! This crate turns a cart, a tip choice, a promo code and a delivery zone
//! into one authoritative total. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (web / app)                         │   │
//! │  │    Menu ──► Cart ──► Checkout ──► Order status                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              storefront-checkout (async service)                │   │
//! │  │    geocoding, promo lookups, sessions, order placement         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  units  │ │line_item │ │   tip   │ │  zone   │ │  promo  │ │   │
//! │  │   └─────────┘ └──────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌─────────────┐ ┌──────────────┐    │   │
//! │  │   │  money  │ │  totals  │ │    cart     │ │ edit_window  │    │   │
//! │  │   └─────────┘ └──────────┘ └─────────────┘ └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILE SYSTEM • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent `Money` and basis-point `Rate`
//! - [`units`] - Price units, fixed-decimal quantities, quantity drafts
//! - [`line_item`] - Cart lines and their totals
//! - [`tip`] - Tip resolution and the delivery tip cap
//! - [`zone`] - Haversine delivery zone resolution and minimum-order checks
//! - [`promo`] - Promo code validation and discounts
//! - [`totals`] - The totals aggregator and quotes
//! - [`cart`] - The cart aggregate
//! - [`edit_window`] - Post-order edit/cancel window
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: lookups happen in the service layer and are passed in
//! 3. **Integer Money**: all monetary values are cents (`i64`)
//! 4. **Fixed-Decimal Quantities**: weights never touch `f64`
//! 5. **Explicit Errors**: typed errors with user-facing messages
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use rust_decimal::Decimal;
//! use storefront_core::{Cart, CatalogItem, PriceUnit, PricingPolicy, Quantity, Rate};
//!
//! let mut cart = Cart::default();
//! let salmon = CatalogItem {
//!     sku: "SALMON".into(),
//!     name: "Atlantic Salmon".into(),
//!     unit_price_cents: 999,
//!     price_unit: PriceUnit::Lb,
//!     image_ref: None,
//! };
//! cart.add_item(&salmon, Quantity::parse("1.5").unwrap(), vec![], None).unwrap();
//! cart.set_tip_percent(Decimal::ZERO);
//!
//! let policy = PricingPolicy { tax_rate: Rate::from_percent(8), ..Default::default() };
//! let quote = cart.quote(&policy, Utc::now());
//!
//! // $9.99/lb × 1.5 lb = $14.99, plus 8% tax = $1.20
//! assert_eq!(quote.totals.grand_total.cents(), 1619);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod edit_window;
pub mod error;
pub mod line_item;
pub mod money;
pub mod promo;
pub mod tip;
pub mod totals;
pub mod types;
pub mod units;
pub mod validation;
pub mod zone;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use edit_window::{EditWindowState, OrderEditWindow, OrderLifecycle, OrderState};
pub use error::{CoreError, CoreResult, PromoError, ValidationError, WindowError, ZoneError};
pub use line_item::{CartItem, Modifier};
pub use money::{Money, Rate};
pub use promo::{AppliedPromo, Promo, PromoBook};
pub use tip::{TipPolicy, TipResult, TipSelection};
pub use totals::{CartTotals, CheckoutBlocker, PricingPolicy, PromoStatus, Quote};
pub use types::*;
pub use units::{PriceUnit, Quantity, StepDirection};
pub use zone::{DeliveryZone, ZoneResolution, ZoneTable, ZoneTier};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line, in its own unit.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit or modifier price, in cents ($100,000).
///
/// ## Business Reason
/// Keeps every cart total far inside `i64` cents: 100 lines at 999 units
/// of the maximum price still fit with room to spare.
pub const MAX_PRICE_CENTS: i64 = 10_000_000;

/// Maximum fixed tip, in cents ($10,000).
pub const MAX_TIP_CENTS: i64 = 1_000_000;
