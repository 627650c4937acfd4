//! # Cart Aggregate
//!
//! The single mutable cart owned by one client session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  UI Action               Operation                State Change          │
//! │  ─────────               ─────────                ────────────          │
//! │                                                                         │
//! │  Add to cart ──────────► add_item() ────────────► merge or push line    │
//! │  Tap + / - ────────────► step_quantity() ───────► qty ± step / remove   │
//! │  Type quantity ────────► set_quantity() ────────► clamp / remove        │
//! │  Edit note ────────────► set_note()                                     │
//! │  Pick tip ─────────────► set_tip_percent() / set_tip_amount()           │
//! │  Enter code ───────────► apply_promo() ─────────► replaces, never stacks│
//! │  Pickup / delivery ────► set_fulfillment()                              │
//! │  Address resolved ─────► set_delivery_zone()                            │
//! │                                                                         │
//! │  Any time ─────────────► quote() ───────────────► (read only)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are never stored on the cart. [`Cart::quote`] is the one place
//! they are computed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::line_item::{normalize_note, CartItem, Modifier};
use crate::money::Money;
use crate::promo::{apply_promo, AppliedPromo, Promo};
use crate::tip::{TipPolicy, TipSelection, TipState};
use crate::totals::{self, CheckoutBlocker, PricingPolicy, Quote};
use crate::types::{CatalogItem, CustomerHistory, FulfillmentType};
use crate::units::{Quantity, StepDirection, StepOutcome};
use crate::validation::{
    validate_cart_size, validate_catalog_item, validate_modifiers, validate_note,
};
use crate::zone::{check_minimum_order, ZoneResolution};
use crate::MAX_CART_ITEMS;

/// The shopping cart.
///
/// ## Invariants
/// - Lines with the same SKU, price, unit, modifiers and note are merged
/// - Every quantity is clamped to its unit; below the minimum removes the line
/// - At most `MAX_CART_ITEMS` lines
/// - At most one promo; applying another replaces it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,

    tip: TipState,

    promo: Option<AppliedPromo>,

    fulfillment: FulfillmentType,

    delivery_zone: Option<ZoneResolution>,

    /// When the cart was created/last cleared
    created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(tip_policy: &TipPolicy) -> Self {
        Cart {
            items: Vec::new(),
            tip: TipState::new(tip_policy),
            promo: None,
            fulfillment: FulfillmentType::default(),
            delivery_zone: None,
            created_at: Utc::now(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, line_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == line_id)
    }

    pub fn tip(&self) -> &TipState {
        &self.tip
    }

    pub fn promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    pub fn fulfillment(&self) -> FulfillmentType {
        self.fulfillment
    }

    pub fn delivery_zone(&self) -> Option<&ZoneResolution> {
        self.delivery_zone.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        totals::subtotal(&self.items)
    }

    // -------------------------------------------------------------------------
    // Line Operations
    // -------------------------------------------------------------------------

    /// Adds a catalog item, or grows the matching line.
    ///
    /// Returns the id of the line that now holds the item.
    pub fn add_item(
        &mut self,
        item: &CatalogItem,
        qty: Quantity,
        modifiers: Vec<Modifier>,
        note: Option<String>,
    ) -> CoreResult<String> {
        validate_catalog_item(item)?;
        validate_modifiers(&modifiers)?;
        validate_note(note.as_deref())?;
        let note = normalize_note(note);

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.same_configuration(item, &modifiers, &note))
        {
            let merged = Quantity::new(line.qty.value().saturating_add(qty.value()));
            line.qty = line.price_unit.clamp(merged);
            debug!(line_id = %line.id, sku = %line.sku, qty = %line.qty, "Merged into existing line");
            return Ok(line.id.clone());
        }

        validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        })?;

        let line = CartItem::from_catalog(item, qty, modifiers, note);
        let id = line.id.clone();
        debug!(line_id = %id, sku = %line.sku, qty = %line.qty, "Added line");
        self.items.push(line);
        Ok(id)
    }

    /// Removes a line by id.
    pub fn remove_item(&mut self, line_id: &str) -> CoreResult<CartItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        let removed = self.items.remove(index);
        debug!(line_id = %line_id, sku = %removed.sku, "Removed line");
        Ok(removed)
    }

    /// Sets a committed quantity.
    ///
    /// Anything below the unit minimum (including zero) removes the line and
    /// returns `None`. Otherwise the quantity is clamped to the unit.
    pub fn set_quantity(&mut self, line_id: &str, qty: Quantity) -> CoreResult<Option<Quantity>> {
        let line = self.line_mut(line_id)?;
        if qty.value() < line.price_unit.minimum() {
            self.remove_item(line_id)?;
            return Ok(None);
        }
        line.qty = line.price_unit.clamp(qty);
        debug!(line_id = %line_id, qty = %line.qty, "Set quantity");
        Ok(Some(line.qty))
    }

    /// One step up or down. Stepping below the minimum removes the line.
    pub fn step_quantity(
        &mut self,
        line_id: &str,
        direction: StepDirection,
    ) -> CoreResult<Option<Quantity>> {
        let line = self.line_mut(line_id)?;
        match line.price_unit.increment(line.qty, direction) {
            StepOutcome::Set(qty) => {
                line.qty = qty;
                debug!(line_id = %line_id, qty = %qty, ?direction, "Stepped quantity");
                Ok(Some(qty))
            }
            StepOutcome::Remove => {
                self.remove_item(line_id)?;
                Ok(None)
            }
        }
    }

    pub fn set_note(&mut self, line_id: &str, note: Option<String>) -> CoreResult<()> {
        validate_note(note.as_deref())?;
        let line = self.line_mut(line_id)?;
        line.note = normalize_note(note);
        debug!(line_id = %line_id, has_note = line.note.is_some(), "Set note");
        Ok(())
    }

    fn line_mut(&mut self, line_id: &str) -> CoreResult<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Tip
    // -------------------------------------------------------------------------

    pub fn set_tip_percent(&mut self, percent: Decimal) {
        self.tip.select_percent(percent);
        debug!(%percent, "Tip set to percent");
    }

    pub fn set_tip_amount(&mut self, amount: Decimal, policy: &TipPolicy) {
        let subtotal = self.subtotal();
        self.tip.select_amount(amount, subtotal, policy);
        debug!(%amount, "Tip set to amount");
    }

    pub fn set_tip(&mut self, selection: TipSelection, policy: &TipPolicy) {
        match selection {
            TipSelection::Percent(p) => self.set_tip_percent(p),
            TipSelection::Amount(a) => self.set_tip_amount(a, policy),
        }
    }

    // -------------------------------------------------------------------------
    // Promo
    // -------------------------------------------------------------------------

    /// Validates `code` against `record` and, on success, replaces any
    /// previously applied promo. A rejected code leaves the cart unchanged.
    pub fn apply_promo(
        &mut self,
        code: &str,
        record: Option<&Promo>,
        history: &CustomerHistory,
        now: DateTime<Utc>,
    ) -> CoreResult<&AppliedPromo> {
        let applied = apply_promo(code, record, self.subtotal(), history, now)?;
        debug!(code = %applied.code, discount = %applied.discount, "Applied promo");
        Ok(self.promo.insert(applied))
    }

    pub fn clear_promo(&mut self) -> Option<AppliedPromo> {
        let removed = self.promo.take();
        if let Some(p) = &removed {
            debug!(code = %p.code, "Cleared promo");
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Fulfillment
    // -------------------------------------------------------------------------

    pub fn set_fulfillment(&mut self, fulfillment: FulfillmentType) {
        self.fulfillment = fulfillment;
        debug!(?fulfillment, "Set fulfillment");
    }

    /// Stores (or clears) the zone the delivery address resolved to.
    pub fn set_delivery_zone(&mut self, zone: Option<ZoneResolution>) {
        debug!(zone = ?zone.as_ref().map(|z| &z.zone.label), "Set delivery zone");
        self.delivery_zone = zone;
    }

    /// Empties the cart. Tip, fulfillment and zone are kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.promo = None;
        self.created_at = Utc::now();
        debug!("Cleared cart");
    }

    // -------------------------------------------------------------------------
    // Quote
    // -------------------------------------------------------------------------

    /// Prices the cart. Read-only.
    pub fn quote(&self, policy: &PricingPolicy, now: DateTime<Utc>) -> Quote {
        let zone = self.delivery_zone.as_ref().map(|r| &r.zone);
        let breakdown = totals::price(
            &self.items,
            policy,
            &self.tip.selection(),
            self.promo.as_ref(),
            zone,
            self.fulfillment,
        );

        let delivery_zone = if self.fulfillment.is_delivery() {
            zone.cloned()
        } else {
            None
        };
        let minimum_order = delivery_zone
            .as_ref()
            .and_then(|z| check_minimum_order(breakdown.totals.subtotal, z));

        let mut blockers = Vec::new();
        if self.items.is_empty() {
            blockers.push(CheckoutBlocker::EmptyCart);
        }
        if self.fulfillment.is_delivery() && delivery_zone.is_none() {
            blockers.push(CheckoutBlocker::NoDeliveryZone);
        }
        if let Some(shortfall) = &minimum_order {
            blockers.push(CheckoutBlocker::BelowMinimumOrder {
                minimum: shortfall.minimum,
                deficit: shortfall.deficit,
            });
        }

        Quote {
            totals: breakdown.totals,
            tip_warning: breakdown.tip.cap_warning(),
            tip: breakdown.tip,
            promo: breakdown.promo,
            delivery_zone,
            minimum_order,
            blockers,
            line_count: self.items.len(),
            quoted_at: now,
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new(&TipPolicy::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::money::Rate;
    use crate::promo::DiscountKind;
    use crate::units::PriceUnit;
    use crate::zone::DeliveryZone;
    use chrono::Duration;

    fn catalog(sku: &str, cents: i64, unit: PriceUnit) -> CatalogItem {
        CatalogItem {
            sku: sku.to_string(),
            name: format!("Item {}", sku),
            unit_price_cents: cents,
            price_unit: unit,
            image_ref: None,
        }
    }

    fn qty(s: &str) -> Quantity {
        Quantity::parse(s).unwrap()
    }

    fn policy() -> PricingPolicy {
        PricingPolicy {
            tax_rate: Rate::from_percent(8),
            ..PricingPolicy::default()
        }
    }

    fn promo_record(code: &str, percent: i64, min_subtotal_cents: i64) -> Promo {
        Promo {
            code: code.to_string(),
            discount_type: DiscountKind::Percentage,
            discount_value: percent,
            min_subtotal_cents,
            max_discount_cents: None,
            first_time_only: false,
            one_per_customer: false,
            start_date: Utc::now() - Duration::days(1),
            expire_date: None,
            usage_limit: None,
            usage_count: 0,
            is_active: true,
        }
    }

    fn zone(min_order_cents: i64) -> ZoneResolution {
        ZoneResolution {
            zone: DeliveryZone {
                label: "Near".to_string(),
                fee_cents: 299,
                min_order_cents,
                eta_minutes: 25,
            },
            distance_km: 1.2,
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::default();
        cart.add_item(&catalog("BURGER", 1200, PriceUnit::Each), Quantity::whole(2), vec![], None)
            .unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal().cents(), 2400);
    }

    #[test]
    fn test_cart_add_same_configuration_merges() {
        let mut cart = Cart::default();
        let burger = catalog("BURGER", 1200, PriceUnit::Each);

        let a = cart.add_item(&burger, Quantity::whole(2), vec![], None).unwrap();
        let b = cart.add_item(&burger, Quantity::whole(3), vec![], None).unwrap();
        assert_eq!(a, b);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.item(&a).unwrap().qty, Quantity::whole(5));

        // Different modifiers make a separate line
        cart.add_item(&burger, Quantity::whole(1), vec![Modifier::new("Cheese", 100)], None)
            .unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_cart_rejects_invalid_catalog_item() {
        let mut cart = Cart::default();
        let err = cart
            .add_item(&catalog("", 100, PriceUnit::Each), Quantity::whole(1), vec![], None)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_huge_quantity_clamps_to_max() {
        let mut cart = Cart::default();
        let salmon = catalog("SALMON", 999, PriceUnit::Lb);
        let huge: Quantity = serde_json::from_str("\"70000000000000000000000000000\"").unwrap();

        let id = cart.add_item(&salmon, huge, vec![], None).unwrap();
        assert_eq!(cart.item(&id).unwrap().qty, qty("999"));

        // merging another huge amount stays at the cap
        cart.add_item(&salmon, huge, vec![], None).unwrap();
        assert_eq!(cart.item(&id).unwrap().qty, qty("999"));
        assert_eq!(cart.set_quantity(&id, huge).unwrap(), Some(qty("999")));
    }

    #[test]
    fn test_huge_tip_amount_is_bounded() {
        let policy = policy();
        let mut cart = Cart::default();
        cart.add_item(&catalog("LATTE", 450, PriceUnit::Each), Quantity::whole(1), vec![], None)
            .unwrap();

        let huge: TipSelection =
            serde_json::from_str(r#"{"mode":"amount","value":"79228162514264337593543950335"}"#)
                .unwrap();
        cart.set_tip(huge, &policy.tip);

        let quote = cart.quote(&policy, Utc::now());
        assert_eq!(quote.totals.tips.cents(), crate::MAX_TIP_CENTS);
    }

    #[test]
    fn test_oversized_prices_are_rejected() {
        let mut cart = Cart::default();
        let err = cart
            .add_item(
                &catalog("GOLD", i64::MAX / 2 + 1, PriceUnit::Each),
                Quantity::whole(1),
                vec![],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));

        let err = cart
            .add_item(
                &catalog("BURGER", 1200, PriceUnit::Each),
                Quantity::whole(1),
                vec![Modifier::new("Truffle", i64::MAX)],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_max_priced_cart_totals_fit() {
        let policy = policy();
        let mut cart = Cart::default();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(
                &catalog(&format!("SKU-{i}"), crate::MAX_PRICE_CENTS, PriceUnit::Each),
                Quantity::whole(crate::MAX_ITEM_QUANTITY),
                vec![Modifier::new("Engraving", crate::MAX_PRICE_CENTS)],
                None,
            )
            .unwrap();
        }

        let quote = cart.quote(&policy, Utc::now());
        let expected = 2 * crate::MAX_PRICE_CENTS * crate::MAX_ITEM_QUANTITY * MAX_CART_ITEMS as i64;
        assert_eq!(quote.totals.subtotal.cents(), expected);
        assert!(quote.totals.grand_total > quote.totals.subtotal);
    }

    #[test]
    fn test_cart_size_limit() {
        let mut cart = Cart::default();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&catalog(&format!("SKU-{i}"), 100, PriceUnit::Each), Quantity::whole(1), vec![], None)
                .unwrap();
        }
        let err = cart
            .add_item(&catalog("ONE-MORE", 100, PriceUnit::Each), Quantity::whole(1), vec![], None)
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { max: 100 }));
    }

    #[test]
    fn test_set_quantity_below_minimum_removes() {
        let mut cart = Cart::default();
        let id = cart
            .add_item(&catalog("SALMON", 999, PriceUnit::Lb), qty("1.5"), vec![], None)
            .unwrap();

        assert_eq!(cart.set_quantity(&id, qty("2.3")).unwrap(), Some(qty("2.25")));
        assert_eq!(cart.set_quantity(&id, qty("0.1")).unwrap(), None);
        assert!(cart.is_empty());
        assert!(matches!(cart.set_quantity(&id, qty("1")), Err(CoreError::LineNotFound(_))));
    }

    #[test]
    fn test_step_down_from_minimum_removes_line() {
        let mut cart = Cart::default();
        let id = cart
            .add_item(&catalog("APPLES", 299, PriceUnit::Lb), qty("0.5"), vec![], None)
            .unwrap();

        assert_eq!(cart.step_quantity(&id, StepDirection::Down).unwrap(), Some(qty("0.25")));
        assert_eq!(cart.step_quantity(&id, StepDirection::Down).unwrap(), None);
        assert!(cart.item(&id).is_none());
    }

    #[test]
    fn test_rapid_increments_are_not_lost() {
        let mut cart = Cart::default();
        let id = cart
            .add_item(&catalog("APPLES", 299, PriceUnit::Lb), qty("0.25"), vec![], None)
            .unwrap();
        for _ in 0..39 {
            cart.step_quantity(&id, StepDirection::Up).unwrap();
        }
        assert_eq!(cart.item(&id).unwrap().qty.value(), Decimal::from(10));
    }

    #[test]
    fn test_set_note() {
        let mut cart = Cart::default();
        let id = cart
            .add_item(&catalog("LATTE", 450, PriceUnit::Each), Quantity::whole(1), vec![], None)
            .unwrap();
        cart.set_note(&id, Some("  extra hot ".to_string())).unwrap();
        assert_eq!(cart.item(&id).unwrap().note.as_deref(), Some("extra hot"));
        cart.set_note(&id, Some(String::new())).unwrap();
        assert!(cart.item(&id).unwrap().note.is_none());
    }

    #[test]
    fn test_apply_promo_replaces_previous() {
        let mut cart = Cart::default();
        cart.add_item(&catalog("BURGER", 1200, PriceUnit::Each), Quantity::whole(2), vec![], None)
            .unwrap();
        let history = CustomerHistory::first_time();

        let first = promo_record("SAVE10", 10, 0);
        cart.apply_promo("save10", Some(&first), &history, Utc::now()).unwrap();
        let second = promo_record("SAVE20", 20, 0);
        cart.apply_promo("SAVE20", Some(&second), &history, Utc::now()).unwrap();
        assert_eq!(cart.promo().unwrap().code, "SAVE20");

        let quote = cart.quote(&policy(), Utc::now());
        assert_eq!(quote.totals.discount.cents(), 480);
    }

    #[test]
    fn test_rejected_promo_keeps_previous() {
        let mut cart = Cart::default();
        cart.add_item(&catalog("BURGER", 1200, PriceUnit::Each), Quantity::whole(2), vec![], None)
            .unwrap();
        let history = CustomerHistory::first_time();
        let good = promo_record("SAVE10", 10, 0);
        cart.apply_promo("SAVE10", Some(&good), &history, Utc::now()).unwrap();

        let err = cart.apply_promo("BOGUS", None, &history, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Promo(_)));
        assert_eq!(cart.promo().unwrap().code, "SAVE10");
        assert!(cart.clear_promo().is_some());
        assert!(cart.promo().is_none());
    }

    #[test]
    fn test_promo_revalidated_when_cart_shrinks() {
        let mut cart = Cart::default();
        let id = cart
            .add_item(&catalog("BURGER", 1200, PriceUnit::Each), Quantity::whole(3), vec![], None)
            .unwrap();
        let record = promo_record("SAVE10", 10, 3000);
        cart.apply_promo("SAVE10", Some(&record), &CustomerHistory::first_time(), Utc::now())
            .unwrap();

        cart.set_quantity(&id, Quantity::whole(2)).unwrap();
        let quote = cart.quote(&policy(), Utc::now());
        assert_eq!(quote.totals.discount, Money::zero());
        assert!(matches!(
            quote.promo,
            totals::PromoStatus::BelowMinimum { deficit, .. } if deficit.cents() == 600
        ));
    }

    #[test]
    fn test_tip_amount_resets_percent_to_closest_preset() {
        let policy = TipPolicy::default();
        let mut cart = Cart::new(&policy);
        cart.add_item(&catalog("PIZZA", 2000, PriceUnit::Each), Quantity::whole(1), vec![], None)
            .unwrap();

        cart.set_tip_amount(Decimal::new(350, 2), &policy);
        assert_eq!(cart.tip().percent_value(), Decimal::from(18));
        assert_eq!(cart.tip().selection(), TipSelection::Amount(Decimal::new(350, 2)));

        cart.set_tip(TipSelection::percent(20), &policy);
        assert_eq!(cart.tip().amount_value(), Decimal::ZERO);
    }

    #[test]
    fn test_quote_end_to_end() {
        let mut cart = Cart::default();
        cart.add_item(&catalog("BURGER", 1200, PriceUnit::Each), Quantity::whole(2), vec![], None)
            .unwrap();
        cart.add_item(&catalog("SALMON", 999, PriceUnit::Lb), qty("1.5"), vec![], None)
            .unwrap();
        cart.set_tip_percent(Decimal::from(15));

        let quote = cart.quote(&policy(), Utc::now());
        assert_eq!(quote.totals.subtotal.cents(), 3899);
        assert_eq!(quote.totals.tax.cents(), 312);
        assert_eq!(quote.totals.tips.cents(), 585);
        assert_eq!(quote.totals.grand_total.cents(), 4796);
        assert!(quote.can_checkout());
        assert_eq!(quote.line_count, 2);
    }

    #[test]
    fn test_quote_delivery_blockers() {
        let mut cart = Cart::default();
        cart.add_item(&catalog("SALAD", 1800, PriceUnit::Each), Quantity::whole(1), vec![], None)
            .unwrap();
        cart.set_fulfillment(FulfillmentType::Delivery);

        let quote = cart.quote(&policy(), Utc::now());
        assert_eq!(quote.blockers, vec![CheckoutBlocker::NoDeliveryZone]);

        cart.set_delivery_zone(Some(zone(2000)));
        let quote = cart.quote(&policy(), Utc::now());
        let shortfall = quote.minimum_order.clone().unwrap();
        assert_eq!(shortfall.deficit.cents(), 200);
        assert_eq!(
            quote.blockers,
            vec![CheckoutBlocker::BelowMinimumOrder {
                minimum: Money::from_dollars(20),
                deficit: Money::from_dollars(2),
            }]
        );
        assert_eq!(quote.totals.delivery_fee.cents(), 299);

        // Switching to pickup drops the zone checks
        cart.set_fulfillment(FulfillmentType::Pickup);
        let quote = cart.quote(&policy(), Utc::now());
        assert!(quote.can_checkout());
        assert!(quote.delivery_zone.is_none());
    }

    #[test]
    fn test_empty_cart_blocks_checkout() {
        let cart = Cart::default();
        let quote = cart.quote(&policy(), Utc::now());
        assert_eq!(quote.blockers, vec![CheckoutBlocker::EmptyCart]);
        assert_eq!(quote.totals.grand_total, Money::zero());
    }

    #[test]
    fn test_clear_keeps_fulfillment() {
        let mut cart = Cart::default();
        cart.set_fulfillment(FulfillmentType::Delivery);
        cart.add_item(&catalog("SALAD", 1800, PriceUnit::Each), Quantity::whole(1), vec![], None)
            .unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.fulfillment(), FulfillmentType::Delivery);
    }
}
