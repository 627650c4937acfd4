//! # Unit / Quantity Model
//!
//! Defines the price units a product can be sold in and the rules every
//! quantity-mutating operation follows.
//!
//! ## Discrete vs. Continuous
//! ```text
//! ┌──────────┬────────────┬────────┬─────────┬─────┬────────┐
//! │ unit     │ continuous │ step   │ minimum │ dp  │ suffix │
//! ├──────────┼────────────┼────────┼─────────┼─────┼────────┤
//! │ each     │ no         │ 1      │ 1       │ 0   │        │
//! │ pack     │ no         │ 1      │ 1       │ 0   │  pk    │
//! │ dozen    │ no         │ 1      │ 1       │ 0   │  doz   │
//! │ piece    │ no         │ 1      │ 1       │ 0   │  pc    │
//! │ bunch    │ no         │ 1      │ 1       │ 0   │  bunch │
//! │ lb       │ yes        │ 0.25   │ 0.25    │ 2   │  lb    │
//! │ oz       │ yes        │ 0.5    │ 0.5     │ 2   │  oz    │
//! │ kg       │ yes        │ 0.1    │ 0.1     │ 2   │  kg    │
//! │ g        │ yes        │ 50     │ 50      │ 2   │  g     │
//! └──────────┴────────────┴────────┴─────────┴─────┴────────┘
//! ```
//!
//! Quantities are fixed-decimal (`rust_decimal`), never `f64`, so tapping
//! "+" forty times on a 0.25 lb step lands exactly on 10.00.
//!
//! ## Decrement Policy
//! Stepping below the unit minimum yields [`StepOutcome::Remove`]. The cart
//! treats that as a remove-item request instead of pinning to the minimum.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Quantity
// =============================================================================

/// A fixed-decimal quantity. Serialised as a decimal string (`"1.5"`).
///
/// Deserialisation goes through [`Quantity::parse`], so JSON numbers and
/// negative strings are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Quantity(Decimal);

impl Quantity {
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Quantity(value)
    }

    /// Whole-number quantity, e.g. `Quantity::whole(2)`.
    #[inline]
    pub fn whole(n: i64) -> Self {
        Quantity(Decimal::from(n))
    }

    /// Parses a complete decimal string.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        let value = Decimal::from_str(trimmed).map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a number", trimmed),
        })?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        Ok(Quantity(value))
    }

    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<i64> for Quantity {
    fn from(n: i64) -> Self {
        Quantity::whole(n)
    }
}

impl From<Quantity> for String {
    fn from(qty: Quantity) -> Self {
        qty.0.to_string()
    }
}

impl TryFrom<String> for Quantity {
    type Error = ValidationError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Quantity::parse(&text)
    }
}

// =============================================================================
// Price Unit
// =============================================================================

/// The unit a product's price is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PriceUnit {
    #[default]
    Each,
    Lb,
    Oz,
    Kg,
    G,
    Pack,
    Dozen,
    Bunch,
    Piece,
}

/// Direction of a "+" / "−" tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StepDirection {
    Up,
    Down,
}

/// Result of stepping a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The new, valid quantity.
    Set(Quantity),
    /// The step would fall below the unit minimum: remove the line.
    Remove,
}

impl PriceUnit {
    /// Weight units are priced per continuous amount.
    pub const fn is_continuous(&self) -> bool {
        matches!(self, PriceUnit::Lb | PriceUnit::Oz | PriceUnit::Kg | PriceUnit::G)
    }

    /// Smallest increment.
    pub fn step(&self) -> Decimal {
        match self {
            PriceUnit::Lb => Decimal::new(25, 2),
            PriceUnit::Oz => Decimal::new(5, 1),
            PriceUnit::Kg => Decimal::new(1, 1),
            PriceUnit::G => Decimal::from(50),
            _ => Decimal::ONE,
        }
    }

    /// Smallest allowed quantity. Equal to one step for every unit.
    pub fn minimum(&self) -> Decimal {
        self.step()
    }

    /// Display and rounding precision.
    pub const fn decimal_places(&self) -> u32 {
        if self.is_continuous() {
            2
        } else {
            0
        }
    }

    pub const fn display_suffix(&self) -> &'static str {
        match self {
            PriceUnit::Each => "",
            PriceUnit::Lb => " lb",
            PriceUnit::Oz => " oz",
            PriceUnit::Kg => " kg",
            PriceUnit::G => " g",
            PriceUnit::Pack => " pk",
            PriceUnit::Dozen => " doz",
            PriceUnit::Bunch => " bunch",
            PriceUnit::Piece => " pc",
        }
    }

    /// Largest step-aligned quantity not above `max`.
    fn aligned_max(&self, max: Decimal) -> Decimal {
        self.floor_to_step(max).max(self.minimum())
    }

    /// Largest multiple of `step` not above `value`.
    fn floor_to_step(&self, value: Decimal) -> Decimal {
        let step = self.step();
        value
            .checked_div(step)
            .and_then(|steps| steps.floor().checked_mul(step))
            // Only sub-unit steps overflow here, and they divide every whole number.
            .unwrap_or_else(|| value.floor())
    }

    /// Rounds to the nearest multiple of `step`, then to `decimal_places`.
    ///
    /// Values too large to divide by the step fall back to the nearest
    /// whole number below them.
    pub fn align_to_step(&self, value: Decimal) -> Decimal {
        let step = self.step();
        let aligned = value
            .checked_div(step)
            .map(|steps| steps.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|steps| steps.checked_mul(step))
            .unwrap_or_else(|| value.floor());
        aligned.round_dp(self.decimal_places())
    }

    /// Clamps to `[minimum, MAX_ITEM_QUANTITY]` after aligning to the step.
    pub fn clamp(&self, qty: Quantity) -> Quantity {
        self.clamp_within(qty, Decimal::from(MAX_ITEM_QUANTITY))
    }

    /// Clamps to `[minimum, max]` after aligning to the step.
    ///
    /// The raw value is bounded first, so any parseable quantity clamps
    /// instead of overflowing.
    pub fn clamp_within(&self, qty: Quantity, max: Decimal) -> Quantity {
        let upper = self.aligned_max(max);
        let bounded = qty.value().max(self.minimum()).min(upper);
        let clamped = self.align_to_step(bounded).max(self.minimum()).min(upper);
        Quantity(clamped.round_dp(self.decimal_places()))
    }

    /// True when `qty` is in range and sits on a step boundary.
    pub fn is_valid(&self, qty: Quantity) -> bool {
        let v = qty.value();
        v >= self.minimum()
            && v <= Decimal::from(MAX_ITEM_QUANTITY)
            && (v % self.step()).is_zero()
    }

    /// Adds or subtracts one step.
    ///
    /// ```rust
    /// use storefront_core::units::{PriceUnit, Quantity, StepDirection, StepOutcome};
    ///
    /// let q = Quantity::parse("0.25").unwrap();
    /// assert_eq!(PriceUnit::Lb.increment(q, StepDirection::Down), StepOutcome::Remove);
    /// ```
    pub fn increment(&self, qty: Quantity, direction: StepDirection) -> StepOutcome {
        let current = self.clamp(qty).value();
        match direction {
            StepDirection::Up => StepOutcome::Set(self.clamp(Quantity(current + self.step()))),
            StepDirection::Down => {
                let next = current - self.step();
                if next < self.minimum() {
                    StepOutcome::Remove
                } else {
                    StepOutcome::Set(Quantity(next.round_dp(self.decimal_places())))
                }
            }
        }
    }

    /// Renders without the suffix, padded to `decimal_places`.
    pub fn format_value(&self, qty: Quantity) -> String {
        let mut v = qty.value().round_dp(self.decimal_places());
        v.rescale(self.decimal_places());
        v.to_string()
    }

    /// Renders with precision and suffix, e.g. `"1.50 lb"` or `"3"`.
    pub fn format(&self, qty: Quantity) -> String {
        format!("{}{}", self.format_value(qty), self.display_suffix())
    }
}

impl fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PriceUnit::Each => "each",
            PriceUnit::Lb => "lb",
            PriceUnit::Oz => "oz",
            PriceUnit::Kg => "kg",
            PriceUnit::G => "g",
            PriceUnit::Pack => "pack",
            PriceUnit::Dozen => "dozen",
            PriceUnit::Bunch => "bunch",
            PriceUnit::Piece => "piece",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// Quantity Draft (text input)
// =============================================================================

/// Editing buffer behind a quantity text field.
///
/// ## Lifecycle
/// ```text
/// focus ──► edit("1") ──► edit("1.") ──► edit("1.3") ──► commit() ──► 1.25 lb
///              │              │
///              └── partial text is kept as typed, nothing is committed
/// ```
///
/// Invalid keystrokes (letters, a second '.', too many decimals) are
/// rejected and the buffer keeps its previous text.
#[derive(Debug, Clone)]
pub struct QuantityDraft {
    unit: PriceUnit,
    text: String,
    committed: Quantity,
}

impl QuantityDraft {
    pub fn new(unit: PriceUnit, committed: Quantity) -> Self {
        let committed = unit.clamp(committed);
        QuantityDraft {
            unit,
            text: unit.format_value(committed),
            committed,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn committed(&self) -> Quantity {
        self.committed
    }

    /// Replaces the buffer if `text` is an acceptable partial number.
    ///
    /// Returns `false` (and keeps the old text) otherwise.
    pub fn edit(&mut self, text: &str) -> bool {
        if !is_partial_number(text, self.unit.decimal_places()) {
            return false;
        }
        self.text = text.to_string();
        true
    }

    /// Parses the buffer if it currently holds a complete number.
    pub fn pending(&self) -> Option<Quantity> {
        let trimmed = self.text.trim_end_matches('.');
        if trimmed.is_empty() || trimmed == "." {
            return None;
        }
        Quantity::parse(trimmed).ok()
    }

    /// Commits the buffer on blur/confirm.
    ///
    /// Empty or unparsable text falls back to the last committed value.
    pub fn commit(&mut self) -> Quantity {
        let next = match self.pending() {
            Some(qty) => self.unit.clamp(qty),
            None => self.committed,
        };
        self.committed = next;
        self.text = self.unit.format_value(next);
        next
    }
}

/// Accepts digits with at most one '.', and no more fractional digits than
/// `decimal_places`. Empty text is a valid partial value.
fn is_partial_number(text: &str, decimal_places: u32) -> bool {
    let mut seen_dot = false;
    let mut fraction_digits = 0u32;
    for c in text.chars() {
        match c {
            '0'..='9' => {
                if seen_dot {
                    fraction_digits += 1;
                }
            }
            '.' if !seen_dot && decimal_places > 0 => seen_dot = true,
            _ => return false,
        }
    }
    fraction_digits <= decimal_places
}

// =============================================================================
// Unit Tests
// =============================================================================
