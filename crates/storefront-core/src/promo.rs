//! # Promo / Coupon Validator
//!
//! Validates a promo code and computes its discount.
//!
//! ## Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stops at the first failure:                                            │
//! │                                                                         │
//! │  1. record exists && is_active ──────────► NotFound                     │
//! │  2. start_date <= now <= expire_date ────► NotYetActive / Expired       │
//! │  3. usage_count < usage_limit ───────────► UsageLimitReached            │
//! │  4. first_time_only → no prior order ────► NotFirstTime                 │
//! │  5. one_per_customer → not redeemed ─────► AlreadyUsed                  │
//! │  6. subtotal >= min_subtotal ────────────► BelowMinimum                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount
//! - Percentage: `round(subtotal × value / 100)`
//! - Fixed amount: `value` cents
//!
//! Both are then capped by `max_discount_cents` (when set) and by the
//! subtotal, so a discount never pushes the pre-tax total below zero.
//!
//! Codes match case-insensitively and surrounding whitespace is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::PromoError;
use crate::money::{Money, Rate};
use crate::types::CustomerHistory;

/// Canonical form of a promo code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

// =============================================================================
// Promo Record
// =============================================================================

/// Discount kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `discount_value` is a whole percentage, 0–100.
    Percentage,
    /// `discount_value` is an amount in cents.
    FixedAmount,
}

/// A code-activated discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Promo {
    pub code: String,

    pub discount_type: DiscountKind,

    /// Percentage (0–100) or cents, depending on `discount_type`.
    pub discount_value: i64,

    #[serde(default)]
    pub min_subtotal_cents: i64,

    #[serde(default)]
    pub max_discount_cents: Option<i64>,

    #[serde(default)]
    pub first_time_only: bool,

    #[serde(default)]
    pub one_per_customer: bool,

    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expire_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub usage_limit: Option<u32>,

    #[serde(default)]
    pub usage_count: u32,

    pub is_active: bool,
}

impl Promo {
    #[inline]
    pub fn min_subtotal(&self) -> Money {
        Money::from_cents(self.min_subtotal_cents)
    }

    /// True when `code` names this promo.
    pub fn matches(&self, code: &str) -> bool {
        normalize_code(&self.code) == normalize_code(code)
    }

    /// Runs checks 1–6 in order.
    pub fn validate(
        &self,
        subtotal: Money,
        history: &CustomerHistory,
        now: DateTime<Utc>,
    ) -> Result<(), PromoError> {
        let code = normalize_code(&self.code);

        if !self.is_active {
            return Err(PromoError::NotFound { code });
        }

        if now < self.start_date {
            return Err(PromoError::NotYetActive { code });
        }
        if let Some(expires) = self.expire_date {
            if now > expires {
                return Err(PromoError::Expired { code });
            }
        }

        if let Some(limit) = self.usage_limit {
            if self.usage_count >= limit {
                return Err(PromoError::UsageLimitReached { code });
            }
        }

        if self.first_time_only && !history.is_first_time() {
            return Err(PromoError::NotFirstTime { code });
        }

        if self.one_per_customer && history.has_redeemed(&code) {
            return Err(PromoError::AlreadyUsed { code });
        }

        self.check_minimum(subtotal)
    }

    /// Check 6 on its own; re-run whenever the subtotal changes.
    pub fn check_minimum(&self, subtotal: Money) -> Result<(), PromoError> {
        if subtotal < self.min_subtotal() {
            return Err(PromoError::BelowMinimum {
                code: normalize_code(&self.code),
                minimum: self.min_subtotal(),
                deficit: subtotal.shortfall_to(self.min_subtotal()),
            });
        }
        Ok(())
    }

    /// Discount for `subtotal`, bounded by the max discount and the subtotal.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        let raw = match self.discount_type {
            DiscountKind::Percentage => {
                let percent = self.discount_value.clamp(0, 100) as u32;
                subtotal.apply_rate(Rate::from_percent(percent))
            }
            DiscountKind::FixedAmount => Money::from_cents(self.discount_value.max(0)),
        };

        let capped = match self.max_discount_cents {
            Some(max) => raw.min(Money::from_cents(max)),
            None => raw,
        };
        capped.min(subtotal.floor_zero()).floor_zero()
    }
}

// =============================================================================
// Applying a Code
// =============================================================================

/// A promo that passed validation, with the discount it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPromo {
    /// Normalised code.
    pub code: String,
    pub promo: Promo,
    pub discount: Money,
}

impl AppliedPromo {
    /// Recomputes the discount for a changed subtotal.
    ///
    /// Only the minimum-subtotal rule is re-checked; the others were settled
    /// when the code was applied.
    pub fn discount_at(&self, subtotal: Money) -> Result<Money, PromoError> {
        self.promo.check_minimum(subtotal)?;
        Ok(self.promo.discount_for(subtotal))
    }
}

/// Validates `code` against `record` (the promo the code looked up to, if
/// any) and computes the discount.
///
/// ```rust
/// use chrono::Utc;
/// use storefront_core::money::Money;
/// use storefront_core::promo::{apply_promo, DiscountKind, Promo};
/// use storefront_core::types::CustomerHistory;
///
/// let promo = Promo {
///     code: "SAVE10".into(),
///     discount_type: DiscountKind::Percentage,
///     discount_value: 10,
///     min_subtotal_cents: 0,
///     max_discount_cents: None,
///     first_time_only: false,
///     one_per_customer: false,
///     start_date: Utc::now() - chrono::Duration::days(1),
///     expire_date: None,
///     usage_limit: None,
///     usage_count: 0,
///     is_active: true,
/// };
/// let applied = apply_promo(
///     "save10",
///     Some(&promo),
///     Money::from_cents(5000),
///     &CustomerHistory::first_time(),
///     Utc::now(),
/// )
/// .unwrap();
/// assert_eq!(applied.discount.cents(), 500);
/// ```
pub fn apply_promo(
    code: &str,
    record: Option<&Promo>,
    subtotal: Money,
    history: &CustomerHistory,
    now: DateTime<Utc>,
) -> Result<AppliedPromo, PromoError> {
    let normalized = normalize_code(code);
    let promo = match record {
        Some(p) if p.matches(&normalized) => p,
        _ => return Err(PromoError::NotFound { code: normalized }),
    };

    promo.validate(subtotal, history, now)?;

    Ok(AppliedPromo {
        code: normalized,
        promo: promo.clone(),
        discount: promo.discount_for(subtotal),
    })
}

// =============================================================================
// Promo Book
// =============================================================================

/// In-memory promo catalog keyed by normalised code.
#[derive(Debug, Clone, Default)]
pub struct PromoBook {
    promos: HashMap<String, Promo>,
}

impl PromoBook {
    pub fn new(promos: impl IntoIterator<Item = Promo>) -> Self {
        let mut book = PromoBook::default();
        for promo in promos {
            book.insert(promo);
        }
        book
    }

    /// Adds or replaces a promo.
    pub fn insert(&mut self, promo: Promo) {
        self.promos.insert(normalize_code(&promo.code), promo);
    }

    pub fn find(&self, code: &str) -> Option<&Promo> {
        self.promos.get(&normalize_code(code))
    }

    pub fn len(&self) -> usize {
        self.promos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.promos.is_empty()
    }

    /// Looks up `code` and applies it.
    pub fn apply(
        &self,
        code: &str,
        subtotal: Money,
        history: &CustomerHistory,
        now: DateTime<Utc>,
    ) -> Result<AppliedPromo, PromoError> {
        apply_promo(code, self.find(code), subtotal, history, now)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn percent_promo(code: &str, percent: i64) -> Promo {
        Promo {
            code: code.to_string(),
            discount_type: DiscountKind::Percentage,
            discount_value: percent,
            min_subtotal_cents: 0,
            max_discount_cents: None,
            first_time_only: false,
            one_per_customer: false,
            start_date: now() - Duration::days(30),
            expire_date: Some(now() + Duration::days(30)),
            usage_limit: None,
            usage_count: 0,
            is_active: true,
        }
    }

    fn fixed_promo(code: &str, cents: i64) -> Promo {
        Promo {
            discount_type: DiscountKind::FixedAmount,
            discount_value: cents,
            ..percent_promo(code, 0)
        }
    }

    fn apply(promo: &Promo, code: &str, subtotal: i64, history: &CustomerHistory) -> Result<AppliedPromo, PromoError> {
        apply_promo(code, Some(promo), Money::from_cents(subtotal), history, now())
    }

    #[test]
    fn test_case_insensitive_codes_match() {
        let promo = percent_promo("SAVE10", 10);
        let history = CustomerHistory::first_time();
        let lower = apply(&promo, "save10", 4000, &history).unwrap();
        let upper = apply(&promo, "SAVE10", 4000, &history).unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.discount.cents(), 400);
        assert_eq!(lower.code, "SAVE10");
    }

    #[test]
    fn test_unknown_and_inactive_are_not_found() {
        let history = CustomerHistory::first_time();
        let err = apply_promo("NOPE", None, Money::from_cents(100), &history, now()).unwrap_err();
        assert_eq!(err.reason(), "not-found");

        let mut promo = percent_promo("SAVE10", 10);
        promo.is_active = false;
        assert_eq!(apply(&promo, "SAVE10", 100, &history).unwrap_err().reason(), "not-found");

        let other = percent_promo("OTHER", 10);
        assert_eq!(apply(&other, "SAVE10", 100, &history).unwrap_err().reason(), "not-found");
    }

    #[test]
    fn test_date_window() {
        let history = CustomerHistory::first_time();
        let mut promo = percent_promo("SPRING", 10);
        promo.start_date = now() + Duration::hours(1);
        assert_eq!(apply(&promo, "SPRING", 100, &history).unwrap_err().reason(), "not-started");

        promo.start_date = now() - Duration::days(10);
        promo.expire_date = Some(now() - Duration::seconds(1));
        assert_eq!(apply(&promo, "SPRING", 100, &history).unwrap_err().reason(), "expired");

        promo.expire_date = None;
        assert!(apply(&promo, "SPRING", 100, &history).is_ok());
    }

    #[test]
    fn test_usage_limit() {
        let history = CustomerHistory::first_time();
        let mut promo = percent_promo("LIMITED", 10);
        promo.usage_limit = Some(5);
        promo.usage_count = 5;
        assert_eq!(apply(&promo, "LIMITED", 100, &history).unwrap_err().reason(), "usage-limit");
        promo.usage_count = 4;
        assert!(apply(&promo, "LIMITED", 100, &history).is_ok());
    }

    #[test]
    fn test_first_time_and_one_per_customer() {
        let mut promo = percent_promo("WELCOME", 20);
        promo.first_time_only = true;
        promo.one_per_customer = true;

        let mut history = CustomerHistory::first_time();
        assert!(apply(&promo, "welcome", 1000, &history).is_ok());

        history.record_order(None);
        assert_eq!(apply(&promo, "welcome", 1000, &history).unwrap_err().reason(), "not-first-time");

        promo.first_time_only = false;
        history.record_order(Some("Welcome"));
        assert_eq!(apply(&promo, "welcome", 1000, &history).unwrap_err().reason(), "already-used");
    }

    #[test]
    fn test_validation_short_circuits_in_order() {
        // Expired AND below minimum: expiry is reported.
        let mut promo = percent_promo("OLD", 10);
        promo.expire_date = Some(now() - Duration::days(1));
        promo.min_subtotal_cents = 5000;
        let err = apply(&promo, "OLD", 100, &CustomerHistory::first_time()).unwrap_err();
        assert_eq!(err.reason(), "expired");
    }

    #[test]
    fn test_below_minimum_reports_deficit() {
        let mut promo = fixed_promo("FIVEOFF", 500);
        promo.min_subtotal_cents = 2500;
        let err = apply(&promo, "FIVEOFF", 1800, &CustomerHistory::first_time()).unwrap_err();
        assert_eq!(
            err,
            PromoError::BelowMinimum {
                code: "FIVEOFF".to_string(),
                minimum: Money::from_cents(2500),
                deficit: Money::from_cents(700),
            }
        );
    }

    #[test]
    fn test_percentage_respects_max_discount() {
        let mut promo = percent_promo("HALF", 50);
        promo.max_discount_cents = Some(1000);
        let applied = apply(&promo, "HALF", 5000, &CustomerHistory::first_time()).unwrap();
        assert_eq!(applied.discount.cents(), 1000);
    }

    #[test]
    fn test_fixed_never_exceeds_subtotal() {
        let promo = fixed_promo("TENOFF", 1000);
        let applied = apply(&promo, "TENOFF", 650, &CustomerHistory::first_time()).unwrap();
        assert_eq!(applied.discount.cents(), 650);
    }

    #[test]
    fn test_hundred_percent_off() {
        let promo = percent_promo("FREE", 100);
        let applied = apply(&promo, "FREE", 3899, &CustomerHistory::first_time()).unwrap();
        assert_eq!(applied.discount.cents(), 3899);
    }

    #[test]
    fn test_discount_at_rechecks_minimum() {
        let mut promo = percent_promo("SAVE10", 10);
        promo.min_subtotal_cents = 2000;
        let applied = apply(&promo, "SAVE10", 3000, &CustomerHistory::first_time()).unwrap();
        assert_eq!(applied.discount_at(Money::from_cents(4000)).unwrap().cents(), 400);
        assert_eq!(applied.discount_at(Money::from_cents(1500)).unwrap_err().reason(), "below-minimum");
    }

    #[test]
    fn test_promo_book_lookup() {
        let book = PromoBook::new(vec![percent_promo("Save10", 10), fixed_promo("FIVEOFF", 500)]);
        assert_eq!(book.len(), 2);
        assert!(book.find("SAVE10").is_some());
        assert!(book.find(" fiveoff ").is_some());
        let applied = book
            .apply("fiveoff", Money::from_cents(2000), &CustomerHistory::first_time(), now())
            .unwrap();
        assert_eq!(applied.discount.cents(), 500);
        assert!(book
            .apply("missing", Money::from_cents(2000), &CustomerHistory::first_time(), now())
            .is_err());
    }

    #[test]
    fn test_promo_wire_format() {
        let json = r#"{
            "code": "SAVE10",
            "discountType": "percentage",
            "discountValue": 10,
            "startDate": "2026-01-01T00:00:00Z",
            "isActive": true
        }"#;
        let promo: Promo = serde_json::from_str(json).unwrap();
        assert_eq!(promo.discount_type, DiscountKind::Percentage);
        assert_eq!(promo.usage_count, 0);
        assert!(promo.expire_date.is_none());
    }
}
