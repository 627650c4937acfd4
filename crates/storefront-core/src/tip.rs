//! # Tip Calculator
//!
//! Resolves a tip selection into cents and applies the delivery tip cap.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TipSelection::Percent(15)  ──► round(subtotal × 15 / 100)             │
//! │  TipSelection::Amount(4.50) ──► round(4.50 × 100) = 450                │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                    fulfillment == Delivery && cap configured?           │
//! │                          │ yes                    │ no                  │
//! │                          ▼                        ▼                     │
//! │              capped = min(nominal, cap)     capped = nominal            │
//! │              exceeds_cap = nominal > cap                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both the nominal and the capped amounts are reported. Receipts and
//! payment capture use `capped_tip_cents`, the cap warning uses both.
//!
//! The tip base is always the gross subtotal; discounts do not shrink it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Rate};
use crate::types::FulfillmentType;
use crate::MAX_TIP_CENTS;

/// Highest percentage a tip selection keeps.
pub const MAX_TIP_PERCENT: u32 = 100;

// =============================================================================
// Tip Policy
// =============================================================================

/// Store-level tip settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TipPolicy {
    /// Percent presets offered as buttons.
    pub presets: Vec<u32>,

    /// Preset selected for a fresh cart.
    pub default_percent: u32,

    /// Maximum tip the delivery partner accepts. `None` disables the cap.
    pub delivery_cap: Option<Money>,
}

impl Default for TipPolicy {
    fn default() -> Self {
        TipPolicy {
            presets: vec![10, 15, 18, 20, 25],
            default_percent: 15,
            delivery_cap: Some(Money::from_dollars(50)),
        }
    }
}

impl TipPolicy {
    /// The preset nearest `percent`; ties go to the lower preset.
    pub fn closest_preset(&self, percent: Decimal) -> u32 {
        self.presets
            .iter()
            .copied()
            .min_by_key(|p| ((Decimal::from(*p) - percent).abs(), *p))
            .unwrap_or(self.default_percent)
    }
}

// =============================================================================
// Tip Selection
// =============================================================================

/// The customer's tip choice.
///
/// Wire format: `{"mode":"percent","value":"15"}` or
/// `{"mode":"amount","value":"4.50"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum TipSelection {
    /// Percentage of the gross subtotal.
    Percent(Decimal),
    /// Fixed amount in currency units.
    Amount(Decimal),
}

impl TipSelection {
    pub fn percent(p: u32) -> Self {
        TipSelection::Percent(Decimal::from(p))
    }

    pub fn no_tip() -> Self {
        TipSelection::Amount(Decimal::ZERO)
    }

    /// Nominal tip before any cap. Negative input resolves to zero and
    /// oversized input saturates.
    pub fn nominal(&self, subtotal: Money) -> Money {
        let tip = match self {
            TipSelection::Percent(p) => {
                let bps = (*p)
                    .max(Decimal::ZERO)
                    .checked_mul(Decimal::ONE_HUNDRED)
                    .map(|b| b.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
                    .and_then(|b| b.to_u32())
                    .unwrap_or(u32::MAX);
                subtotal.apply_rate(Rate::from_bps(bps))
            }
            TipSelection::Amount(units) => Money::from_decimal_units(*units),
        };
        tip.floor_zero()
    }
}

// =============================================================================
// Tip Result
// =============================================================================

/// Outcome of resolving a tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TipResult {
    /// What the customer asked for.
    pub tip_cents: Money,

    /// True when `tip_cents` is above the delivery cap.
    pub exceeds_cap: bool,

    /// What will actually be charged.
    pub capped_tip_cents: Money,

    /// The cap that applied, if any.
    pub cap: Option<Money>,
}

impl TipResult {
    /// Amount that will not be charged.
    pub fn excess(&self) -> Money {
        self.tip_cents - self.capped_tip_cents
    }

    /// A warning plus the auto-correct action, when the cap kicked in.
    pub fn cap_warning(&self) -> Option<TipCapWarning> {
        if !self.exceeds_cap {
            return None;
        }
        Some(TipCapWarning {
            message: format!(
                "Delivery tips are limited to {}. The extra {} will not be charged.",
                self.capped_tip_cents,
                self.excess()
            ),
            suggested: TipSelection::Amount(Decimal::new(self.capped_tip_cents.cents(), 2)),
        })
    }
}

/// Warning shown when the tip exceeds the delivery cap. Not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipCapWarning {
    pub message: String,

    /// Selection that sets the tip to exactly the cap.
    pub suggested: TipSelection,
}

/// Resolves a selection against the gross subtotal.
///
/// ```rust
/// use storefront_core::money::Money;
/// use storefront_core::tip::{resolve_tip, TipPolicy, TipSelection};
/// use storefront_core::types::FulfillmentType;
///
/// let result = resolve_tip(
///     &TipSelection::percent(15),
///     Money::from_cents(3899),
///     FulfillmentType::Pickup,
///     &TipPolicy::default(),
/// );
/// assert_eq!(result.capped_tip_cents.cents(), 585);
/// ```
pub fn resolve_tip(
    selection: &TipSelection,
    subtotal: Money,
    fulfillment: FulfillmentType,
    policy: &TipPolicy,
) -> TipResult {
    let nominal = selection.nominal(subtotal);
    let cap = if fulfillment.is_delivery() {
        policy.delivery_cap
    } else {
        None
    };

    match cap {
        Some(cap) if nominal > cap => TipResult {
            tip_cents: nominal,
            exceeds_cap: true,
            capped_tip_cents: cap,
            cap: Some(cap),
        },
        _ => TipResult {
            tip_cents: nominal,
            exceeds_cap: false,
            capped_tip_cents: nominal,
            cap,
        },
    }
}

// =============================================================================
// Tip State
// =============================================================================

/// Which tip input is currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TipMode {
    Percent,
    Amount,
}

/// Both tip inputs, with exactly one active.
///
/// Switching modes resets the inactive value: choosing an amount resets the
/// percent to the closest preset, choosing a percent resets the amount to 0.
/// A stale value from the other mode can never resurface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipState {
    mode: TipMode,
    percent: Decimal,
    amount: Decimal,
}

impl TipState {
    pub fn new(policy: &TipPolicy) -> Self {
        TipState {
            mode: TipMode::Percent,
            percent: Decimal::from(policy.default_percent),
            amount: Decimal::ZERO,
        }
    }

    pub fn mode(&self) -> TipMode {
        self.mode
    }

    pub fn percent_value(&self) -> Decimal {
        self.percent
    }

    pub fn amount_value(&self) -> Decimal {
        self.amount
    }

    /// Active selection.
    pub fn selection(&self) -> TipSelection {
        match self.mode {
            TipMode::Percent => TipSelection::Percent(self.percent),
            TipMode::Amount => TipSelection::Amount(self.amount),
        }
    }

    /// Selects a percentage, kept within `0..=MAX_TIP_PERCENT`; the stored
    /// amount goes back to 0.
    pub fn select_percent(&mut self, percent: Decimal) {
        self.mode = TipMode::Percent;
        self.percent = percent.clamp(Decimal::ZERO, Decimal::from(MAX_TIP_PERCENT));
        self.amount = Decimal::ZERO;
    }

    /// Selects a fixed amount, kept within `0..=MAX_TIP_CENTS`; the stored
    /// percent snaps to the preset closest to what the amount represents of
    /// `subtotal`.
    pub fn select_amount(&mut self, amount: Decimal, subtotal: Money, policy: &TipPolicy) {
        self.mode = TipMode::Amount;
        self.amount = amount.clamp(Decimal::ZERO, Decimal::new(MAX_TIP_CENTS, 2));
        self.percent = if subtotal.is_positive() {
            // amount is bounded, so this stays well inside Decimal range
            let implied = self.amount * Decimal::from(10_000) / Decimal::from(subtotal.cents());
            Decimal::from(policy.closest_preset(implied))
        } else {
            Decimal::from(policy.default_percent)
        };
    }

    /// Applies a selection, using the same reset rules.
    pub fn select(&mut self, selection: TipSelection, subtotal: Money, policy: &TipPolicy) {
        match selection {
            TipSelection::Percent(p) => self.select_percent(p),
            TipSelection::Amount(a) => self.select_amount(a, subtotal, policy),
        }
    }
}

impl Default for TipState {
    fn default() -> Self {
        TipState::new(&TipPolicy::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_with_cap(dollars: i64) -> TipPolicy {
        TipPolicy {
            delivery_cap: Some(Money::from_dollars(dollars)),
            ..TipPolicy::default()
        }
    }

    #[test]
    fn test_percent_tip_rounds_to_cent() {
        let result = resolve_tip(
            &TipSelection::percent(15),
            Money::from_cents(3899),
            FulfillmentType::Pickup,
            &TipPolicy::default(),
        );
        assert_eq!(result.tip_cents.cents(), 585);
        assert_eq!(result.capped_tip_cents.cents(), 585);
        assert!(!result.exceeds_cap);
        assert!(result.cap.is_none());
    }

    #[test]
    fn test_fractional_percent() {
        let sel = TipSelection::Percent(Decimal::new(175, 1)); // 17.5%
        assert_eq!(sel.nominal(Money::from_cents(2000)).cents(), 350);
    }

    #[test]
    fn test_amount_tip() {
        let sel = TipSelection::Amount(Decimal::new(450, 2));
        assert_eq!(sel.nominal(Money::from_cents(1)).cents(), 450);
        assert_eq!(TipSelection::Amount(Decimal::new(-5, 0)).nominal(Money::zero()), Money::zero());
    }

    #[test]
    fn test_delivery_cap_applies() {
        let cap = 20;
        let selection = TipSelection::Amount(Decimal::from(cap + 50));
        let result = resolve_tip(
            &selection,
            Money::from_dollars(100),
            FulfillmentType::Delivery,
            &policy_with_cap(cap),
        );
        assert!(result.exceeds_cap);
        assert_eq!(result.capped_tip_cents.cents(), cap * 100);
        assert_eq!(result.tip_cents.cents(), (cap + 50) * 100);
        assert_eq!(result.excess().cents(), 5000);

        let warning = result.cap_warning().unwrap();
        assert_eq!(
            warning.message,
            "Delivery tips are limited to $20.00. The extra $50.00 will not be charged."
        );
        assert_eq!(warning.suggested, TipSelection::Amount(Decimal::new(2000, 2)));
    }

    #[test]
    fn test_pickup_is_uncapped() {
        let result = resolve_tip(
            &TipSelection::Amount(Decimal::from(70)),
            Money::from_dollars(100),
            FulfillmentType::Pickup,
            &policy_with_cap(20),
        );
        assert!(!result.exceeds_cap);
        assert_eq!(result.capped_tip_cents.cents(), 7000);
        assert!(result.cap_warning().is_none());
    }

    #[test]
    fn test_tip_equal_to_cap_is_not_excess() {
        let result = resolve_tip(
            &TipSelection::Amount(Decimal::from(20)),
            Money::from_dollars(100),
            FulfillmentType::Delivery,
            &policy_with_cap(20),
        );
        assert!(!result.exceeds_cap);
        assert_eq!(result.cap, Some(Money::from_dollars(20)));
    }

    #[test]
    fn test_cap_disabled() {
        let policy = TipPolicy {
            delivery_cap: None,
            ..TipPolicy::default()
        };
        let result = resolve_tip(
            &TipSelection::Amount(Decimal::from(500)),
            Money::from_dollars(100),
            FulfillmentType::Delivery,
            &policy,
        );
        assert!(!result.exceeds_cap);
        assert_eq!(result.capped_tip_cents, Money::from_dollars(500));
    }

    #[test]
    fn test_mode_switch_resets_other_value() {
        let policy = TipPolicy::default();
        let mut state = TipState::new(&policy);
        assert_eq!(state.selection(), TipSelection::percent(15));

        // $4.00 on a $20.00 subtotal is 20%
        state.select_amount(Decimal::from(4), Money::from_dollars(20), &policy);
        assert_eq!(state.mode(), TipMode::Amount);
        assert_eq!(state.percent_value(), Decimal::from(20));

        state.select_percent(Decimal::from(18));
        assert_eq!(state.mode(), TipMode::Percent);
        assert_eq!(state.amount_value(), Decimal::ZERO);
        assert_eq!(state.selection(), TipSelection::percent(18));
    }

    #[test]
    fn test_amount_on_empty_cart_resets_to_default_preset() {
        let policy = TipPolicy::default();
        let mut state = TipState::new(&policy);
        state.select_percent(Decimal::from(25));
        state.select_amount(Decimal::from(3), Money::zero(), &policy);
        assert_eq!(state.percent_value(), Decimal::from(policy.default_percent));
    }

    #[test]
    fn test_oversized_selection_saturates() {
        let huge = Decimal::MAX;
        assert_eq!(TipSelection::Amount(huge).nominal(Money::zero()), Money::MAX);
        let percent = TipSelection::Percent(huge).nominal(Money::from_dollars(10));
        assert!(percent.is_positive());
    }

    #[test]
    fn test_state_clamps_tip_inputs() {
        let policy = TipPolicy::default();
        let mut state = TipState::new(&policy);

        state.select_amount(Decimal::MAX, Money::from_dollars(20), &policy);
        assert_eq!(state.amount_value(), Decimal::new(MAX_TIP_CENTS, 2));
        assert_eq!(state.percent_value(), Decimal::from(25));

        state.select_percent(Decimal::MAX);
        assert_eq!(state.percent_value(), Decimal::from(MAX_TIP_PERCENT));
        assert_eq!(state.amount_value(), Decimal::ZERO);
    }

    #[test]
    fn test_closest_preset_tie_goes_low() {
        let policy = TipPolicy::default();
        assert_eq!(policy.closest_preset(Decimal::from(19)), 18);
        assert_eq!(policy.closest_preset(Decimal::new(125, 1)), 10);
        assert_eq!(policy.closest_preset(Decimal::from(90)), 25);
    }

    #[test]
    fn test_selection_wire_format() {
        let json = serde_json::to_string(&TipSelection::percent(15)).unwrap();
        assert_eq!(json, r#"{"mode":"percent","value":"15"}"#);
        let back: TipSelection = serde_json::from_str(r#"{"mode":"amount","value":"4.50"}"#).unwrap();
        assert_eq!(back, TipSelection::Amount(Decimal::new(450, 2)));
    }
}
