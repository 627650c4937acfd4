//! # Orders
//!
//! Turns a priced cart into an immutable order and tracks its edit/cancel
//! window.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Cart ──► quote ──► blockers? ──yes──► Err(EmptyCart | NoDeliveryZone │
//! │                          │                   | BelowMinimumOrder)       │
//! │                          no                                             │
//! │                          ▼                                              │
//! │                   ┌─────────────┐   window expires   ┌─────────────┐   │
//! │                   │  Editable   │ ─────────────────► │   Locked    │   │
//! │                   └──────┬──────┘                    └─────────────┘   │
//! │                          │ cancel(now)                                  │
//! │                          ▼                                              │
//! │                   ┌─────────────┐                                       │
//! │                   │  Cancelled  │  (terminal)                           │
//! │                   └─────────────┘                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remaining time is always recomputed from `created_at`; nothing ticks.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{
    Cart, CartItem, CartTotals, CheckoutBlocker, DeliveryZone, EditWindowState, FulfillmentType,
    OrderEditWindow, OrderLifecycle, OrderState, PricingPolicy, PromoStatus, TipResult,
};
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Placed Order
// =============================================================================

/// A snapshot of the cart at the moment it was ordered.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    /// Order id (UUID v4).
    pub id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub items: Vec<CartItem>,

    pub totals: CartTotals,

    pub tip: TipResult,

    pub fulfillment: FulfillmentType,

    pub delivery_zone: Option<DeliveryZone>,

    /// Only set when the promo actually discounted this order.
    pub promo_code: Option<String>,

    pub lifecycle: OrderLifecycle,
}

impl PlacedOrder {
    pub fn edit_window_state(&self, now: DateTime<Utc>) -> EditWindowState {
        self.lifecycle.window.state_at(now)
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> OrderState {
        self.lifecycle.state_at(now)
    }

    /// Cancels the order while it is still editable.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> CheckoutResult<()> {
        self.lifecycle.cancel(now)?;
        info!(order_id = %self.id, "Order cancelled");
        Ok(())
    }
}

/// Prices `cart` and snapshots it into an order.
///
/// Refuses when the quote carries a checkout blocker.
pub fn place_order(
    cart: &Cart,
    policy: &PricingPolicy,
    window_seconds: i64,
    now: DateTime<Utc>,
) -> CheckoutResult<PlacedOrder> {
    let quote = cart.quote(policy, now);

    if let Some(blocker) = quote.blockers.first() {
        warn!(?blocker, "Order refused");
        return Err(match blocker {
            CheckoutBlocker::EmptyCart => CheckoutError::EmptyCart,
            CheckoutBlocker::NoDeliveryZone => CheckoutError::NoDeliveryZone,
            CheckoutBlocker::BelowMinimumOrder { minimum, deficit } => {
                CheckoutError::BelowMinimumOrder {
                    minimum: *minimum,
                    deficit: *deficit,
                }
            }
        });
    }

    let promo_code = match &quote.promo {
        PromoStatus::Applied { code, .. } => Some(code.clone()),
        _ => None,
    };

    let order = PlacedOrder {
        id: Uuid::new_v4().to_string(),
        created_at: now,
        items: cart.items().to_vec(),
        totals: quote.totals,
        tip: quote.tip,
        fulfillment: cart.fulfillment(),
        delivery_zone: quote.delivery_zone,
        promo_code,
        lifecycle: OrderLifecycle::new(OrderEditWindow::new(now, window_seconds)),
    };

    info!(
        order_id = %order.id,
        total = %order.totals.grand_total,
        items = order.items.len(),
        fulfillment = ?order.fulfillment,
        "Order placed"
    );

    Ok(order)
}

// =============================================================================
// Order Book
// =============================================================================

/// Orders placed during this session, by id.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: HashMap<String, PlacedOrder>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: PlacedOrder) {
        self.orders.insert(order.id.clone(), order);
    }

    pub fn get(&self, order_id: &str) -> CheckoutResult<&PlacedOrder> {
        self.orders
            .get(order_id)
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))
    }

    pub fn cancel(&mut self, order_id: &str, now: DateTime<Utc>) -> CheckoutResult<&PlacedOrder> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        order.cancel(now)?;
        Ok(order)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
