//! # Delivery Zone Resolver
//!
//! Maps a geocoded address to a delivery fee tier.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  address coordinates?                                                   │
//! │      │ none / not finite ──────────────────────► Err(InvalidAddress)    │
//! │      ▼                                                                  │
//! │  distance = haversine(store, address)                                   │
//! │      │ > service radius ───────────────────────► Err(OutOfZone)         │
//! │      ▼                                                                  │
//! │  covering tiers = { t | t.radius_km >= distance }                       │
//! │      │ empty ──────────────────────────────────► Err(OutOfZone)         │
//! │      ▼                                                                  │
//! │  winner = smallest radius, then lowest fee, then lowest minimum         │
//! │      ▼                                                                  │
//! │  Ok(ZoneResolution { zone, distance_km })                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The minimum-order check is separate: a zone resolves even when the cart
//! is below its minimum. See [`check_minimum_order`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use ts_rs::TS;

use crate::error::ZoneError;
use crate::money::Money;
use crate::types::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

// =============================================================================
// Zone Types
// =============================================================================

/// A configured delivery tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTier {
    pub label: String,

    /// Outer edge of the tier, measured from the store.
    pub radius_km: f64,

    pub fee_cents: i64,

    pub min_order_cents: i64,

    pub eta_minutes: u32,
}

/// The zone an address resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryZone {
    pub label: String,
    pub fee_cents: i64,
    pub min_order_cents: i64,
    pub eta_minutes: u32,
}

impl DeliveryZone {
    #[inline]
    pub fn fee(&self) -> Money {
        Money::from_cents(self.fee_cents)
    }

    #[inline]
    pub fn min_order(&self) -> Money {
        Money::from_cents(self.min_order_cents)
    }
}

impl From<&ZoneTier> for DeliveryZone {
    fn from(tier: &ZoneTier) -> Self {
        DeliveryZone {
            label: tier.label.clone(),
            fee_cents: tier.fee_cents,
            min_order_cents: tier.min_order_cents,
            eta_minutes: tier.eta_minutes,
        }
    }
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ZoneResolution {
    pub zone: DeliveryZone,
    pub distance_km: f64,
}

// =============================================================================
// Zone Table
// =============================================================================

/// The store location plus its tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTable {
    pub store: Coordinates,

    /// Kept sorted by ascending radius.
    tiers: Vec<ZoneTier>,

    /// Hard limit. Defaults to the largest tier radius.
    #[serde(default)]
    service_radius_km: Option<f64>,
}

impl ZoneTable {
    pub fn new(store: Coordinates, mut tiers: Vec<ZoneTier>) -> Self {
        tiers.sort_by(tier_order);
        ZoneTable {
            store,
            tiers,
            service_radius_km: None,
        }
    }

    pub fn with_service_radius(mut self, radius_km: f64) -> Self {
        self.service_radius_km = Some(radius_km);
        self
    }

    pub fn tiers(&self) -> &[ZoneTier] {
        &self.tiers
    }

    pub fn service_radius_km(&self) -> f64 {
        self.service_radius_km.unwrap_or_else(|| {
            self.tiers
                .iter()
                .map(|t| t.radius_km)
                .fold(0.0, f64::max)
        })
    }

    /// Picks the tier covering `distance_km`.
    ///
    /// When tiers overlap, the narrowest radius wins, then the cheaper fee,
    /// then the lower minimum order.
    pub fn tier_for(&self, distance_km: f64) -> Option<&ZoneTier> {
        self.tiers
            .iter()
            .filter(|t| t.radius_km >= distance_km)
            .min_by(|a, b| tier_order(a, b))
    }
}

fn tier_order(a: &ZoneTier, b: &ZoneTier) -> Ordering {
    a.radius_km
        .total_cmp(&b.radius_km)
        .then(a.fee_cents.cmp(&b.fee_cents))
        .then(a.min_order_cents.cmp(&b.min_order_cents))
}

// =============================================================================
// Resolution
// =============================================================================

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Resolves geocoded coordinates to a zone.
///
/// `None` means geocoding found nothing for the address.
pub fn resolve_zone(
    address: Option<Coordinates>,
    table: &ZoneTable,
) -> Result<ZoneResolution, ZoneError> {
    let coords = match address {
        Some(c) if c.is_valid() => c,
        _ => return Err(ZoneError::InvalidAddress),
    };

    let distance_km = haversine_km(table.store, coords);
    let radius_km = table.service_radius_km();
    if distance_km > radius_km {
        return Err(ZoneError::OutOfZone {
            distance_km,
            radius_km,
        });
    }

    let tier = table.tier_for(distance_km).ok_or(ZoneError::OutOfZone {
        distance_km,
        radius_km,
    })?;

    Ok(ZoneResolution {
        zone: DeliveryZone::from(tier),
        distance_km,
    })
}

// =============================================================================
// Minimum Order
// =============================================================================

/// The cart is below the zone minimum. Blocks checkout only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MinimumOrderShortfall {
    pub minimum: Money,
    pub deficit: Money,
}

impl MinimumOrderShortfall {
    pub fn user_message(&self) -> String {
        format!(
            "Add {} more to reach the {} delivery minimum.",
            self.deficit, self.minimum
        )
    }
}

/// Checks `subtotal` against the zone minimum.
pub fn check_minimum_order(subtotal: Money, zone: &DeliveryZone) -> Option<MinimumOrderShortfall> {
    let deficit = subtotal.shortfall_to(zone.min_order());
    if deficit.is_positive() {
        Some(MinimumOrderShortfall {
            minimum: zone.min_order(),
            deficit,
        })
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
