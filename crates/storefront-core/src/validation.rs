//! # Validation Module
//!
//! Input validation for the values that enter the engine from outside.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI                                                           │
//! │  ├── Quantity drafts, basic format checks                              │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart / checkout operations                                   │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: catalog, promo code, and configuration checks        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing                                                      │
//! │  └── Quantities clamped to the unit; never an error                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_promo_code, validate_sku};
//!
//! validate_sku("SALMON-FILLET").unwrap();
//! assert_eq!(validate_promo_code(" save10 ").unwrap(), "SAVE10");
//! ```

use crate::error::ValidationError;
use crate::line_item::Modifier;
use crate::money::{Rate, BPS_PER_WHOLE};
use crate::promo::{normalize_code, DiscountKind, Promo};
use crate::types::CatalogItem;
use crate::{MAX_CART_ITEMS, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted promo code.
pub const MAX_PROMO_CODE_LEN: usize = 32;

/// Longest accepted line note.
pub const MAX_NOTE_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, numbers, hyphens and underscores only
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an item display name (1–200 characters).
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a line note. Empty notes are allowed.
pub fn validate_note(note: Option<&str>) -> ValidationResult<()> {
    match note {
        Some(n) if n.trim().chars().count() > MAX_NOTE_LEN => Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates a promo code and returns its normalised form.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 32 characters
/// - Letters, numbers, hyphens and underscores only
pub fn validate_promo_code(code: &str) -> ValidationResult<String> {
    let code = normalize_code(code);

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "promo code".to_string(),
        });
    }

    if code.len() > MAX_PROMO_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "promo code".to_string(),
            max: MAX_PROMO_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "promo code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero (free item) is allowed.
///
/// ## Rules
/// - Must not be negative
/// - At most MAX_PRICE_CENTS ($100,000)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates modifier deltas. A modifier may discount the item, but by no
/// more than MAX_PRICE_CENTS.
pub fn validate_modifiers(modifiers: &[Modifier]) -> ValidationResult<()> {
    for modifier in modifiers {
        if !(-MAX_PRICE_CENTS..=MAX_PRICE_CENTS).contains(&modifier.price_cents) {
            return Err(ValidationError::OutOfRange {
                field: format!("modifier '{}' price", modifier.name),
                min: -MAX_PRICE_CENTS,
                max: MAX_PRICE_CENTS,
            });
        }
    }

    Ok(())
}

/// Validates a tax rate (0–100%).
pub fn validate_tax_rate(rate: Rate) -> ValidationResult<()> {
    if !rate.is_within_whole() {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: BPS_PER_WHOLE as i64,
        });
    }

    Ok(())
}

/// Validates a promo record before it is offered to customers.
///
/// ## Rules
/// - Code passes [`validate_promo_code`]
/// - Percentage discounts lie within 0–100
/// - Fixed discounts lie within 0..=MAX_PRICE_CENTS
/// - Minimum subtotal and maximum discount are not negative
pub fn validate_promo(promo: &Promo) -> ValidationResult<()> {
    validate_promo_code(&promo.code)?;
    let field = |name: &str| format!("promo {} {}", promo.code, name);

    let max = match promo.discount_type {
        DiscountKind::Percentage => 100,
        DiscountKind::FixedAmount => MAX_PRICE_CENTS,
    };
    if !(0..=max).contains(&promo.discount_value) {
        return Err(ValidationError::OutOfRange {
            field: field("discount value"),
            min: 0,
            max,
        });
    }

    if promo.min_subtotal_cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: field("minimum subtotal"),
        });
    }

    if matches!(promo.max_discount_cents, Some(cents) if cents < 0) {
        return Err(ValidationError::MustBePositive {
            field: field("maximum discount"),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates everything the cart copies from a catalog entry.
pub fn validate_catalog_item(item: &CatalogItem) -> ValidationResult<()> {
    validate_sku(&item.sku)?;
    validate_item_name(&item.name)?;
    validate_price_cents(item.unit_price_cents)
}

/// Validates cart size before adding a new line.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::PriceUnit;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SALMON-FILLET").is_ok());
        assert!(validate_sku("latte_12oz").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Oat Milk Latte").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_note() {
        assert!(validate_note(None).is_ok());
        assert!(validate_note(Some("no onions")).is_ok());
        assert!(validate_note(Some(&"a".repeat(501))).is_err());
    }

    #[test]
    fn test_validate_promo_code() {
        assert_eq!(validate_promo_code("welcome-20").unwrap(), "WELCOME-20");
        assert!(matches!(
            validate_promo_code("  "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_promo_code("SAVE 10"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_promo_code(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_price_and_tax() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX / 2 + 1).is_err());
        assert!(validate_tax_rate(Rate::from_bps(825)).is_ok());
        assert!(validate_tax_rate(Rate::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_validate_catalog_item() {
        let mut item = CatalogItem {
            sku: "APPLES".to_string(),
            name: "Honeycrisp Apples".to_string(),
            unit_price_cents: 299,
            price_unit: PriceUnit::Lb,
            image_ref: None,
        };
        assert!(validate_catalog_item(&item).is_ok());
        item.unit_price_cents = -5;
        assert!(validate_catalog_item(&item).is_err());
    }

    #[test]
    fn test_validate_modifiers() {
        assert!(validate_modifiers(&[]).is_ok());
        assert!(validate_modifiers(&[Modifier::new("Extra shot", 75), Modifier::new("No bun", -100)]).is_ok());
        assert!(matches!(
            validate_modifiers(&[Modifier::new("Gold leaf", MAX_PRICE_CENTS + 1)]),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_promo_ranges() {
        let mut promo = Promo {
            code: "SAVE10".to_string(),
            discount_type: DiscountKind::Percentage,
            discount_value: 10,
            min_subtotal_cents: 0,
            max_discount_cents: None,
            first_time_only: false,
            one_per_customer: false,
            start_date: chrono::Utc::now(),
            expire_date: None,
            usage_limit: None,
            usage_count: 0,
            is_active: true,
        };
        assert!(validate_promo(&promo).is_ok());

        promo.discount_value = 150;
        assert!(matches!(
            validate_promo(&promo),
            Err(ValidationError::OutOfRange { max: 100, .. })
        ));
        promo.discount_value = -5;
        assert!(validate_promo(&promo).is_err());

        promo.discount_type = DiscountKind::FixedAmount;
        promo.discount_value = 500;
        assert!(validate_promo(&promo).is_ok());
        promo.max_discount_cents = Some(-1);
        assert!(validate_promo(&promo).is_err());

        promo.max_discount_cents = None;
        promo.code = "BAD CODE".to_string();
        assert!(validate_promo(&promo).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(99).is_ok());
        assert!(validate_cart_size(100).is_err());
    }
}
