//! # Checkout Error Types
//!
//! Error types for the async checkout layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Lookups      │  │     Domain              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Unavailable    │  │  Core (cart, promo,     │ │
//! │  │  ConfigLoad...  │  │  Timeout        │  │        zone, validation)│ │
//! │  │                 │  │  InvalidResp... │  │  Window                 │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Order placement: EmptyCart, NoDeliveryZone, BelowMinimumOrder, │   │
//! │  │                   OrderNotFound                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors reach the UI as an [`ErrorResponse`] carrying a machine-readable
//! code and the customer-facing message.

use serde::Serialize;
use storefront_core::{CoreError, Money, PromoError, ValidationError, WindowError, ZoneError};
use thiserror::Error;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Result type alias for lookup backends.
pub type LookupResult<T> = Result<T, LookupError>;

// =============================================================================
// Lookup Error
// =============================================================================

/// Failures from a geocoding or promo backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Backend unreachable or returned a server error.
    #[error("Lookup service unavailable: {0}")]
    Unavailable(String),

    /// No answer within the configured timeout.
    #[error("Lookup timed out after {0} seconds")]
    Timeout(u64),

    /// Backend answered with something unusable.
    #[error("Invalid lookup response: {0}")]
    InvalidResponse(String),
}

impl LookupError {
    /// Returns true if the lookup may succeed when repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Unavailable(_) | LookupError::Timeout(_))
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout error type covering every failure the service layer reports.
#[derive(Debug, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse a config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Order window: {0}")]
    Window(#[from] WindowError),

    // =========================================================================
    // Order Placement Errors
    // =========================================================================
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,

    #[error("Delivery selected but no delivery zone resolved")]
    NoDeliveryZone,

    #[error("Subtotal is {deficit} below the {minimum} delivery minimum")]
    BelowMinimumOrder { minimum: Money, deficit: Money },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// A request document could not be parsed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ZoneError> for CheckoutError {
    fn from(err: ZoneError) -> Self {
        CheckoutError::Core(CoreError::Zone(err))
    }
}

impl From<PromoError> for CheckoutError {
    fn from(err: PromoError) -> Self {
        CheckoutError::Core(CoreError::Promo(err))
    }
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for CheckoutError {
    fn from(err: std::io::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CheckoutError {
    fn from(err: toml::de::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::InvalidRequest(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CheckoutError {
    /// Returns true if repeating the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::Lookup(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CheckoutError::InvalidConfig(_) | CheckoutError::ConfigLoadFailed(_)
        )
    }

    /// Machine-readable code for the UI.
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::InvalidConfig(_) | CheckoutError::ConfigLoadFailed(_) => "CONFIG_ERROR",
            CheckoutError::Lookup(LookupError::Timeout(_)) => "LOOKUP_TIMEOUT",
            CheckoutError::Lookup(_) => "LOOKUP_FAILED",
            CheckoutError::Core(CoreError::Zone(z)) => z.code(),
            CheckoutError::Core(CoreError::Promo(_)) => "PROMO_INVALID",
            CheckoutError::Core(CoreError::Validation(_)) => "VALIDATION_ERROR",
            CheckoutError::Core(CoreError::LineNotFound(_)) => "NOT_FOUND",
            CheckoutError::Core(CoreError::CartTooLarge { .. }) => "CART_ERROR",
            CheckoutError::Window(WindowError::Locked) => "ORDER_LOCKED",
            CheckoutError::Window(WindowError::AlreadyCancelled) => "ORDER_CANCELLED",
            CheckoutError::EmptyCart => "EMPTY_CART",
            CheckoutError::NoDeliveryZone => "NO_DELIVERY_ZONE",
            CheckoutError::BelowMinimumOrder { .. } => "BELOW_MINIMUM_ORDER",
            CheckoutError::OrderNotFound(_) => "NOT_FOUND",
            CheckoutError::InvalidRequest(_) => "VALIDATION_ERROR",
        }
    }

    /// Customer-facing message.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Lookup(_) => {
                "We couldn't reach the server. Please try again.".to_string()
            }
            CheckoutError::Core(CoreError::Zone(z)) => z.user_message(),
            CheckoutError::Core(CoreError::Promo(p)) => p.user_message(),
            CheckoutError::Window(w) => w.user_message().to_string(),
            CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
            CheckoutError::NoDeliveryZone => {
                "Enter a delivery address or choose pickup.".to_string()
            }
            CheckoutError::BelowMinimumOrder { minimum, deficit } => format!(
                "Add {} more to reach the {} delivery minimum.",
                deficit, minimum
            ),
            other => other.to_string(),
        }
    }
}

/// What the UI receives when an operation fails.
///
/// ```json
/// { "code": "OUT_OF_ZONE", "message": "Sorry, that address is outside..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&CheckoutError> for ErrorResponse {
    fn from(err: &CheckoutError) -> Self {
        ErrorResponse {
            code: err.code(),
            message: err.user_message(),
            retryable: err.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(CheckoutError::Lookup(LookupError::Unavailable("503".into())).is_retryable());
        assert!(CheckoutError::Lookup(LookupError::Timeout(5)).is_retryable());

        assert!(!CheckoutError::Lookup(LookupError::InvalidResponse("bad".into())).is_retryable());
        assert!(!CheckoutError::InvalidConfig("bad".into()).is_retryable());
        assert!(!CheckoutError::EmptyCart.is_retryable());
    }

    #[test]
    fn test_domain_conversions_keep_codes() {
        let err: CheckoutError = ZoneError::InvalidAddress.into();
        assert_eq!(err.code(), "INVALID_ADDRESS");
        assert!(err.user_message().contains("pickup"));

        let err: CheckoutError = PromoError::Expired {
            code: "SPRING".into(),
        }
        .into();
        assert_eq!(err.code(), "PROMO_INVALID");
        assert_eq!(err.user_message(), "That promo code has expired.");
    }

    #[test]
    fn test_error_response() {
        let err = CheckoutError::BelowMinimumOrder {
            minimum: Money::from_dollars(20),
            deficit: Money::from_cents(200),
        };
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "BELOW_MINIMUM_ORDER");
        assert_eq!(
            response.message,
            "Add $2.00 more to reach the $20.00 delivery minimum."
        );
        assert!(!response.retryable);
    }

    #[test]
    fn test_config_errors() {
        assert!(CheckoutError::InvalidConfig("x".into()).is_config_error());
        assert!(!CheckoutError::EmptyCart.is_config_error());
    }
}
