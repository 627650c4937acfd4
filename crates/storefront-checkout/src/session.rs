//! # Checkout Session
//!
//! One customer's cart plus the lookups that feed it.
//!
//! ## Thread Safety
//! The cart sits behind a `Mutex` so that rapid UI updates are applied one
//! at a time and none are lost. The lock is never held across an `.await`:
//! lookups run unlocked and take the lock only to write their result.
//!
//! ## Stale Lookups
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_address("12 Main")   ticket #1 ──► geocoder (slow) ─────┐      │
//! │  resolve_address("14 Main")   ticket #2 ──► geocoder ──┐         │      │
//! │                                                        ▼         │      │
//! │                                lock cart, #2 current? yes: apply │      │
//! │                                                                  ▼      │
//! │                                lock cart, #1 current? no: Superseded    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ticket is issued when the call is made, not when the future is first
//! polled, so call order defines which result wins.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::tip::TipSelection;
use storefront_core::validation::validate_promo_code;
use storefront_core::zone::resolve_zone;
use storefront_core::{
    AppliedPromo, Cart, CartItem, CatalogItem, CustomerHistory, EditWindowState, FulfillmentType,
    Modifier, PricingPolicy, Quantity, Quote, StepDirection, ZoneResolution, ZoneTable,
};
use tracing::{debug, info, warn};

use crate::config::StorefrontConfig;
use crate::error::{CheckoutError, CheckoutResult, LookupError, LookupResult};
use crate::lookup::{Geocoder, PromoDirectory};
use crate::orders::{self, OrderBook, PlacedOrder};
use crate::sequence::{LookupKind, LookupOutcome, RequestSequencer};

/// Cart contents plus a fresh quote. Returned by every cart operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub quote: Quote,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Session
// =============================================================================

pub struct CheckoutSession<G, P> {
    policy: PricingPolicy,
    zones: ZoneTable,
    edit_window_secs: i64,
    lookup_timeout: Duration,
    initial_backoff: Duration,
    max_backoff: Duration,

    geocoder: G,
    promos: P,
    sequencer: RequestSequencer,

    cart: Mutex<Cart>,
    history: Mutex<CustomerHistory>,
    orders: Mutex<OrderBook>,
}

impl<G: Geocoder, P: PromoDirectory> CheckoutSession<G, P> {
    pub fn new(config: &StorefrontConfig, geocoder: G, promos: P) -> Self {
        let policy = config.pricing_policy();
        let cart = Cart::new(&policy.tip);
        CheckoutSession {
            zones: config.zone_table(),
            edit_window_secs: config.edit_window_secs(),
            lookup_timeout: config.lookup_timeout(),
            initial_backoff: Duration::from_millis(config.lookups.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.lookups.max_backoff_ms),
            policy,
            geocoder,
            promos,
            sequencer: RequestSequencer::new(),
            cart: Mutex::new(cart),
            history: Mutex::new(CustomerHistory::first_time()),
            orders: Mutex::new(OrderBook::new()),
        }
    }

    /// Starts the session for a returning customer.
    pub fn with_history(self, history: CustomerHistory) -> Self {
        *lock(&self.history) = history;
        self
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn history(&self) -> CustomerHistory {
        lock(&self.history).clone()
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = lock(&self.cart);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = lock(&self.cart);
        f(&mut cart)
    }

    fn respond(&self, cart: &Cart) -> CartResponse {
        CartResponse {
            items: cart.items().to_vec(),
            quote: cart.quote(&self.policy, Utc::now()),
        }
    }

    fn mutate<F, R>(&self, f: F) -> CheckoutResult<CartResponse>
    where
        F: FnOnce(&mut Cart) -> CheckoutResult<R>,
    {
        self.with_cart_mut(|cart| -> CheckoutResult<CartResponse> {
            f(cart)?;
            Ok(self.respond(cart))
        })
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    pub fn cart(&self) -> CartResponse {
        self.with_cart(|cart| self.respond(cart))
    }

    pub fn quote(&self) -> Quote {
        self.with_cart(|cart| cart.quote(&self.policy, Utc::now()))
    }

    pub fn add_item(
        &self,
        item: &CatalogItem,
        qty: Quantity,
        modifiers: Vec<Modifier>,
        note: Option<String>,
    ) -> CheckoutResult<CartResponse> {
        self.mutate(|cart| Ok(cart.add_item(item, qty, modifiers, note)?))
    }

    pub fn remove_item(&self, line_id: &str) -> CheckoutResult<CartResponse> {
        self.mutate(|cart| Ok(cart.remove_item(line_id)?))
    }

    pub fn set_quantity(&self, line_id: &str, qty: Quantity) -> CheckoutResult<CartResponse> {
        self.mutate(|cart| Ok(cart.set_quantity(line_id, qty)?))
    }

    pub fn step_quantity(
        &self,
        line_id: &str,
        direction: StepDirection,
    ) -> CheckoutResult<CartResponse> {
        self.mutate(|cart| Ok(cart.step_quantity(line_id, direction)?))
    }

    pub fn set_note(&self, line_id: &str, note: Option<String>) -> CheckoutResult<CartResponse> {
        self.mutate(|cart| Ok(cart.set_note(line_id, note)?))
    }

    pub fn set_tip_percent(&self, percent: Decimal) -> CartResponse {
        self.with_cart_mut(|cart| {
            cart.set_tip_percent(percent);
            self.respond(cart)
        })
    }

    pub fn set_tip_amount(&self, amount: Decimal) -> CartResponse {
        self.with_cart_mut(|cart| {
            cart.set_tip_amount(amount, &self.policy.tip);
            self.respond(cart)
        })
    }

    pub fn set_tip(&self, selection: TipSelection) -> CartResponse {
        self.with_cart_mut(|cart| {
            cart.set_tip(selection, &self.policy.tip);
            self.respond(cart)
        })
    }

    pub fn clear_promo(&self) -> CartResponse {
        self.with_cart_mut(|cart| {
            cart.clear_promo();
            self.respond(cart)
        })
    }

    pub fn set_fulfillment(&self, fulfillment: FulfillmentType) -> CartResponse {
        self.with_cart_mut(|cart| {
            cart.set_fulfillment(fulfillment);
            self.respond(cart)
        })
    }

    pub fn clear_cart(&self) -> CartResponse {
        self.with_cart_mut(|cart| {
            cart.clear();
            self.respond(cart)
        })
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Geocodes `address` and stores the zone it falls in.
    ///
    /// An address that cannot be served clears the stored zone and returns
    /// the [`ZoneError`](storefront_core::ZoneError).
    pub fn resolve_address(
        &self,
        address: &str,
    ) -> impl Future<Output = CheckoutResult<LookupOutcome<ZoneResolution>>> + '_ {
        let ticket = self.sequencer.issue(LookupKind::Geocode);
        let address = address.trim().to_string();

        async move {
            debug!(seq = ticket.seq(), %address, "Geocoding delivery address");
            let coords = self
                .run_lookup(LookupKind::Geocode, || self.geocoder.geocode(&address))
                .await;

            let mut cart = lock(&self.cart);
            if !self.sequencer.is_current(ticket) {
                warn!(seq = ticket.seq(), %address, "Discarding stale geocode result");
                return Ok(LookupOutcome::Superseded);
            }

            match resolve_zone(coords?, &self.zones) {
                Ok(resolution) => {
                    info!(
                        zone = %resolution.zone.label,
                        distance_km = resolution.distance_km,
                        "Delivery zone resolved"
                    );
                    cart.set_delivery_zone(Some(resolution.clone()));
                    Ok(LookupOutcome::Applied(resolution))
                }
                Err(err) => {
                    cart.set_delivery_zone(None);
                    Err(err.into())
                }
            }
        }
    }

    /// Looks up `code` and applies it to the cart, replacing any earlier promo.
    ///
    /// A rejected code leaves the previously applied promo in place.
    pub fn apply_promo_code(
        &self,
        code: &str,
    ) -> impl Future<Output = CheckoutResult<LookupOutcome<AppliedPromo>>> + '_ {
        let ticket = self.sequencer.issue(LookupKind::Promo);
        let code = validate_promo_code(code);

        async move {
            let code = code?;
            debug!(seq = ticket.seq(), %code, "Looking up promo");
            let record = self
                .run_lookup(LookupKind::Promo, || self.promos.find(&code))
                .await;

            let history = self.history();
            let mut cart = lock(&self.cart);
            if !self.sequencer.is_current(ticket) {
                warn!(seq = ticket.seq(), %code, "Discarding stale promo result");
                return Ok(LookupOutcome::Superseded);
            }

            let record = record?;
            let applied = cart.apply_promo(&code, record.as_ref(), &history, Utc::now())?;
            Ok(LookupOutcome::Applied(applied.clone()))
        }
    }

    /// Runs one lookup with retries, bounded by the lookup timeout.
    async fn run_lookup<T, F, Fut>(&self, kind: LookupKind, mut op: F) -> CheckoutResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LookupResult<T>>,
    {
        let mut backoff = self.create_backoff();
        let attempts = async {
            loop {
                match op().await {
                    Ok(value) => return Ok(value),
                    Err(err) if err.is_retryable() => match backoff.next_backoff() {
                        Some(delay) => {
                            warn!(?kind, error = %err, ?delay, "Lookup failed, retrying");
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(err),
                    },
                    Err(err) => return Err(err),
                }
            }
        };

        match tokio::time::timeout(self.lookup_timeout, attempts).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                let secs = self.lookup_timeout.as_secs();
                warn!(?kind, timeout_secs = secs, "Lookup timed out");
                Err(LookupError::Timeout(secs).into())
            }
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: Some(self.lookup_timeout),
            ..Default::default()
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Places the order, records it against the customer and empties the cart.
    pub fn place_order(&self) -> CheckoutResult<PlacedOrder> {
        let order = self.with_cart_mut(|cart| {
            let order = orders::place_order(cart, &self.policy, self.edit_window_secs, Utc::now())?;
            cart.clear();
            Ok::<_, CheckoutError>(order)
        })?;

        lock(&self.history).record_order(order.promo_code.as_deref());
        lock(&self.orders).insert(order.clone());
        Ok(order)
    }

    pub fn order(&self, order_id: &str) -> CheckoutResult<PlacedOrder> {
        lock(&self.orders).get(order_id).cloned()
    }

    pub fn edit_window_state(&self, order_id: &str) -> CheckoutResult<EditWindowState> {
        let orders = lock(&self.orders);
        Ok(orders.get(order_id)?.edit_window_state(Utc::now()))
    }

    /// Cancels an order inside its edit window.
    pub fn cancel_order(&self, order_id: &str) -> CheckoutResult<PlacedOrder> {
        let order = lock(&self.orders).cancel(order_id, Utc::now())?.clone();
        lock(&self.history).forget_order(order.promo_code.as_deref());
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
