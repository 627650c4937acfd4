//! # Money Module
//!
//! Provides the `Money` type for monetary values and the `Rate` type for
//! every percentage the engine applies (tax, percent tips, percentage promos).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │    $9.99/lb × 1.5 lb summed over a cart drifts by fractions of a cent  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + One Rounding Point                       │
//! │    Every rate or quantity multiplication is rounded to a whole cent    │
//! │    immediately, before it is combined with any other amount.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::{Money, Rate};
//!
//! let subtotal = Money::from_cents(3899);
//! let tax = subtotal.apply_rate(Rate::from_percent(8));
//! assert_eq!(tax.cents(), 312);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::units::Quantity;

/// Basis points in one whole (100%).
pub const BPS_PER_WHOLE: u32 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// Arithmetic saturates at the `i64` bounds instead of wrapping.
///
/// ## Where Money Flows
/// ```text
/// CartItem.unit_price ──► line_total ──► subtotal ──┬──► tax
///                                                   ├──► tip (percent)
///                                                   ├──► discount
///                                                   └──► grand_total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Largest representable amount.
    pub const MAX: Money = Money(i64::MAX);

    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole dollars.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars.saturating_mul(100))
    }

    /// Converts an amount given in currency units (e.g. `4.50`) to cents.
    ///
    /// Rounds half away from zero, so `4.505` becomes 451 cents. Amounts
    /// beyond the `i64` range saturate.
    ///
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use storefront_core::money::Money;
    ///
    /// let tip = Money::from_decimal_units(Decimal::new(450, 2));
    /// assert_eq!(tip.cents(), 450);
    /// ```
    pub fn from_decimal_units(units: Decimal) -> Self {
        let cents = units
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|c| c.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero));
        Money(saturating_cents(cents, units.is_sign_negative()))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Returns the amount by which `target` exceeds `self`, or zero.
    ///
    /// Used for "add $2.00 more" style deficits.
    #[inline]
    pub const fn shortfall_to(self, target: Money) -> Money {
        if target.0 > self.0 {
            Money(target.0.saturating_sub(self.0))
        } else {
            Money(0)
        }
    }

    /// Applies a rate and rounds to the nearest cent (half away from zero).
    ///
    /// ## Implementation
    /// `amount * bps / 10000` in `i128` so large carts cannot overflow.
    ///
    /// ```rust
    /// use storefront_core::money::{Money, Rate};
    ///
    /// // 15% of $38.99 = $5.8485 → $5.85
    /// let tip = Money::from_cents(3899).apply_rate(Rate::from_percent(15));
    /// assert_eq!(tip.cents(), 585);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        let cents = div_round_half_away(scaled, BPS_PER_WHOLE as i128);
        Money(i64::try_from(cents).unwrap_or(if cents < 0 { i64::MIN } else { i64::MAX }))
    }

    /// Multiplies a per-unit price by a fixed-decimal quantity, rounded to
    /// the nearest cent.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::units::Quantity;
    ///
    /// // $9.99/lb × 1.5 lb = $14.985 → $14.99
    /// let line = Money::from_cents(999).times_quantity(Quantity::parse("1.5").unwrap());
    /// assert_eq!(line.cents(), 1499);
    /// ```
    pub fn times_quantity(&self, qty: Quantity) -> Money {
        let cents = Decimal::from(self.0)
            .checked_mul(qty.value())
            .map(|c| c.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero));
        Money(saturating_cents(cents, self.is_negative()))
    }
}

/// Whole cents to `i64`, pinned to the bound on the side of `negative`
/// when the value is missing or out of range.
fn saturating_cents(cents: Option<Decimal>, negative: bool) -> i64 {
    let bound = if negative { i64::MIN } else { i64::MAX };
    cents.and_then(|c| c.to_i64()).unwrap_or(bound)
}

/// Integer division rounding half away from zero. `d` must be non-zero.
fn div_round_half_away(n: i128, d: i128) -> i128 {
    let q = n / d;
    let r = n % d;
    if r.abs() * 2 >= d.abs() {
        q + n.signum() * d.signum()
    } else {
        q
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$12.34` / `-$5.50`.
///
/// The UI does its own localisation; this is what receipts, logs and
/// user-facing error messages use.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so `800` = 8% and `1500` = 15%.
/// Used for the tax rate, percent tips and percentage promos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (`15` = 15%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Rate(percent * 100)
    }

    /// Creates a rate from a decimal percentage (`8.25` = 8.25%).
    ///
    /// Returns `None` for negative values or more precision than a basis
    /// point can hold.
    pub fn from_decimal_percent(percent: Decimal) -> Option<Self> {
        if percent.is_sign_negative() {
            return None;
        }
        let bps = percent * Decimal::ONE_HUNDRED;
        if bps.fract() != Decimal::ZERO {
            return None;
        }
        bps.to_u32().map(Rate)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a decimal percentage (`1500` bps → `15`).
    pub fn percent(&self) -> Decimal {
        Decimal::new(self.0 as i64, 2).normalize()
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True when the rate lies within 0–100%.
    #[inline]
    pub const fn is_within_whole(&self) -> bool {
        self.0 <= BPS_PER_WHOLE
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(200).to_string(), "$2.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((b * 3).cents(), 750);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_apply_rate_rounds_half_away_from_zero() {
        // 3899 × 8% = 311.92 → 312
        assert_eq!(Money::from_cents(3899).apply_rate(Rate::from_percent(8)).cents(), 312);
        // 1000 × 8.25% = 82.5 → 83
        assert_eq!(Money::from_cents(1000).apply_rate(Rate::from_bps(825)).cents(), 83);
        // 50 × 1% = 0.5 → 1
        assert_eq!(Money::from_cents(50).apply_rate(Rate::from_percent(1)).cents(), 1);
        // -50 × 1% = -0.5 → -1
        assert_eq!(Money::from_cents(-50).apply_rate(Rate::from_percent(1)).cents(), -1);
        assert_eq!(Money::from_cents(49).apply_rate(Rate::from_percent(1)).cents(), 0);
    }

    #[test]
    fn test_apply_rate_large_amount_does_not_overflow() {
        let big = Money::from_cents(i64::MAX / 2);
        let full = big.apply_rate(Rate::from_percent(100));
        assert_eq!(full, big);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let near_max = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(near_max + near_max, Money::MAX);
        assert_eq!(near_max * 3, Money::MAX);
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));

        let mut total = Money::MAX;
        total += Money::from_cents(1);
        assert_eq!(total, Money::MAX);

        let sum: Money = vec![near_max, near_max, near_max].into_iter().sum();
        assert_eq!(sum, Money::MAX);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        assert_eq!(Money::from_decimal_units(Decimal::MAX), Money::MAX);
        assert_eq!(Money::from_decimal_units(Decimal::MIN).cents(), i64::MIN);
        assert_eq!(Money::MAX.apply_rate(Rate::from_bps(u32::MAX)), Money::MAX);
        let qty = Quantity::new(Decimal::MAX);
        assert_eq!(Money::from_cents(1000).times_quantity(qty), Money::MAX);
    }

    #[test]
    fn test_from_decimal_units() {
        assert_eq!(Money::from_decimal_units(Decimal::new(450, 2)).cents(), 450);
        assert_eq!(Money::from_decimal_units(Decimal::new(4505, 3)).cents(), 451);
        assert_eq!(Money::from_decimal_units(Decimal::from(55)).cents(), 5500);
    }

    #[test]
    fn test_shortfall_and_floor() {
        let subtotal = Money::from_cents(1800);
        assert_eq!(subtotal.shortfall_to(Money::from_dollars(20)).cents(), 200);
        assert_eq!(subtotal.shortfall_to(Money::from_dollars(10)).cents(), 0);
        assert_eq!(Money::from_cents(-1).floor_zero(), Money::zero());
    }

    #[test]
    fn test_rate_from_decimal_percent() {
        assert_eq!(Rate::from_decimal_percent(Decimal::new(825, 2)), Some(Rate::from_bps(825)));
        assert_eq!(Rate::from_decimal_percent(Decimal::from(15)), Some(Rate::from_percent(15)));
        assert_eq!(Rate::from_decimal_percent(Decimal::new(-1, 0)), None);
        assert_eq!(Rate::from_decimal_percent(Decimal::new(12345, 4)), None);
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::from_percent(15).to_string(), "15%");
        assert_eq!(Rate::from_bps(825).to_string(), "8.25%");
        assert!(Rate::from_percent(100).is_within_whole());
        assert!(!Rate::from_bps(10_001).is_within_whole());
    }
}
