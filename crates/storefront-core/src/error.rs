//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Cart operation failures                        │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── ZoneError        - OutOfZone / InvalidAddress                     │
//! │  ├── PromoError       - Promo code rejected, one variant per reason    │
//! │  └── WindowError      - Edit/cancel window closed                      │
//! │                                                                         │
//! │  storefront-checkout errors (separate crate)                           │
//! │  └── CheckoutError    - Lookups, config, order placement               │
//! │                                                                         │
//! │  Not errors (reported on the Quote instead):                           │
//! │  ├── tip above the delivery cap     → TipResult.exceeds_cap            │
//! │  └── below the zone minimum         → Quote.minimum_order              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every customer-facing variant has a `user_message()` that the UI shows
//! verbatim. `Display` stays technical for logs.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Cart operation errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Line id is not in the cart.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Promo code rejected.
    #[error("Promo rejected: {0}")]
    Promo(#[from] PromoError),

    /// Delivery zone could not be resolved.
    #[error("Delivery zone error: {0}")]
    Zone(#[from] ZoneError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Zone Error
// =============================================================================

/// Delivery zone resolution failures.
///
/// Both variants steer the customer towards pickup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    /// The address could not be geocoded.
    #[error("address could not be resolved")]
    InvalidAddress,

    /// The address is farther than the service radius.
    #[error("address is {distance_km:.2} km away, service radius is {radius_km:.2} km")]
    OutOfZone { distance_km: f64, radius_km: f64 },
}

impl ZoneError {
    pub fn user_message(&self) -> String {
        match self {
            ZoneError::InvalidAddress => {
                "We couldn't find that address. Check it and try again, or choose pickup instead."
                    .to_string()
            }
            ZoneError::OutOfZone { .. } => {
                "Sorry, that address is outside our delivery area. Pickup is available."
                    .to_string()
            }
        }
    }

    /// Machine-readable code for the UI.
    pub fn code(&self) -> &'static str {
        match self {
            ZoneError::InvalidAddress => "INVALID_ADDRESS",
            ZoneError::OutOfZone { .. } => "OUT_OF_ZONE",
        }
    }
}

// =============================================================================
// Promo Error
// =============================================================================

/// Reasons a promo code is rejected, in validation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    /// Unknown code, or the record is inactive.
    #[error("promo code '{code}' not found")]
    NotFound { code: String },

    /// `now` is before the promo start date.
    #[error("promo code '{code}' is not active yet")]
    NotYetActive { code: String },

    /// `now` is after the promo expiry date.
    #[error("promo code '{code}' has expired")]
    Expired { code: String },

    /// Global usage limit reached.
    #[error("promo code '{code}' has reached its usage limit")]
    UsageLimitReached { code: String },

    /// First-order-only promo used by a returning customer.
    #[error("promo code '{code}' is for first orders only")]
    NotFirstTime { code: String },

    /// One-per-customer promo already redeemed by this customer.
    #[error("promo code '{code}' was already used")]
    AlreadyUsed { code: String },

    /// Subtotal below the promo minimum.
    #[error("subtotal is {deficit} short of the {minimum} minimum for '{code}'")]
    BelowMinimum {
        code: String,
        minimum: Money,
        deficit: Money,
    },
}

impl PromoError {
    /// The normalised code that was rejected.
    pub fn code(&self) -> &str {
        match self {
            PromoError::NotFound { code }
            | PromoError::NotYetActive { code }
            | PromoError::Expired { code }
            | PromoError::UsageLimitReached { code }
            | PromoError::NotFirstTime { code }
            | PromoError::AlreadyUsed { code }
            | PromoError::BelowMinimum { code, .. } => code,
        }
    }

    /// Stable sub-reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            PromoError::NotFound { .. } => "not-found",
            PromoError::NotYetActive { .. } => "not-started",
            PromoError::Expired { .. } => "expired",
            PromoError::UsageLimitReached { .. } => "usage-limit",
            PromoError::NotFirstTime { .. } => "not-first-time",
            PromoError::AlreadyUsed { .. } => "already-used",
            PromoError::BelowMinimum { .. } => "below-minimum",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            PromoError::NotFound { .. } => "That promo code isn't valid.".to_string(),
            PromoError::NotYetActive { .. } => "That promo code isn't active yet.".to_string(),
            PromoError::Expired { .. } => "That promo code has expired.".to_string(),
            PromoError::UsageLimitReached { .. } => {
                "That promo code is no longer available.".to_string()
            }
            PromoError::NotFirstTime { .. } => {
                "That promo code is only valid on your first order.".to_string()
            }
            PromoError::AlreadyUsed { .. } => "You've already used that promo code.".to_string(),
            PromoError::BelowMinimum {
                minimum, deficit, ..
            } => format!(
                "Add {} more to use this code (minimum order {}).",
                deficit, minimum
            ),
        }
    }
}

// =============================================================================
// Window Error
// =============================================================================

/// Edit/cancel attempts outside the window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// The window expired; the order is locked.
    #[error("order can no longer be changed")]
    Locked,

    /// The order was already cancelled.
    #[error("order is already cancelled")]
    AlreadyCancelled,
}

impl WindowError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WindowError::Locked => {
                "This order is already being prepared and can no longer be changed."
            }
            WindowError::AlreadyCancelled => "This order has already been cancelled.",
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
