//! # storefront-checkout: Async Checkout Service
//!
//! This crate owns every suspension point in the pricing flow and feeds the
//! results into the pure engine in `storefront-core`.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Service                                 │
//! │                                                                         │
//! │   UI ──► CheckoutSession ───────────────────────────────┐               │
//! │              │   │                                      │               │
//! │              │   │ resolve_address / apply_promo_code   │ cart ops      │
//! │              │   ▼                                      ▼               │
//! │              │  RequestSequencer ──► Geocoder      Mutex<Cart>          │
//! │              │  (stale results       PromoDirectory  (storefront-core)  │
//! │              │   are dropped)        + timeout/retry                    │
//! │              ▼                                                          │
//! │          place_order ──► PlacedOrder ──► edit window / cancel           │
//! │                                                                         │
//! │   StorefrontConfig: storefront.toml + STOREFRONT_* env vars             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Configuration (store location, tax, tips, zones, windows)
//! - [`error`] - Checkout and lookup error types
//! - [`lookup`] - `Geocoder` / `PromoDirectory` traits and in-memory backends
//! - [`sequence`] - Request sequencing for overlapping lookups
//! - [`session`] - The checkout session
//! - [`orders`] - Order placement and the edit/cancel window
//! - [`telemetry`] - Tracing subscriber setup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_checkout::{CheckoutSession, StaticGeocoder, StaticPromoDirectory, StorefrontConfig};
//!
//! let config = StorefrontConfig::load_or_default(None);
//! let promos = StaticPromoDirectory::new(config.promos.clone());
//! let session = CheckoutSession::new(&config, StaticGeocoder::new(), promos);
//!
//! session.add_item(&item, Quantity::whole(2), vec![], None)?;
//! session.apply_promo_code("SAVE10").await?;
//! let order = session.place_order()?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod lookup;
pub mod orders;
pub mod sequence;
pub mod session;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::StorefrontConfig;
pub use error::{CheckoutError, CheckoutResult, ErrorResponse, LookupError, LookupResult};
pub use lookup::{Geocoder, PromoDirectory, StaticGeocoder, StaticPromoDirectory};
pub use orders::{place_order, OrderBook, PlacedOrder};
pub use sequence::{LookupKind, LookupOutcome, RequestSequencer, Ticket};
pub use session::{CartResponse, CheckoutSession};
pub use telemetry::init_tracing;
