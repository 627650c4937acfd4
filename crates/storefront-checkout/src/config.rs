//! # Storefront Configuration
//!
//! Configuration management for the checkout service.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_TAX_RATE=8.25                                           │
//! │     STOREFRONT_DELIVERY_TIP_CAP=50.00   (or "off")                     │
//! │     STOREFRONT_EDIT_WINDOW_SECS=600                                    │
//! │     STOREFRONT_STORE_LAT / STOREFRONT_STORE_LON                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.storefront/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Corner Market"
//! lat = 40.7580
//! lon = -73.9855
//!
//! [pricing]
//! tax_rate_bps = 800
//! service_fee_cents = 0
//!
//! [tips]
//! presets = [10, 15, 18, 20, 25]
//! default_percent = 15
//! delivery_cap_cents = 5000
//! delivery_cap_enabled = true   # false removes the cap
//!
//! [[delivery.zones]]
//! label = "Near"
//! radius_km = 3.0
//! fee_cents = 299
//! min_order_cents = 1500
//! eta_minutes = 25
//!
//! [orders]
//! edit_window_secs = 600
//!
//! [lookups]
//! timeout_secs = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use storefront_core::tip::TipPolicy;
use storefront_core::validation::{validate_promo, validate_tax_rate};
use storefront_core::{Coordinates, Money, PricingPolicy, Promo, Rate, ZoneTable, ZoneTier};
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Store latitude in decimal degrees.
    #[serde(default = "default_store_lat")]
    pub lat: f64,

    /// Store longitude in decimal degrees.
    #[serde(default = "default_store_lon")]
    pub lon: f64,
}

fn default_store_name() -> String {
    "Storefront".to_string()
}

fn default_store_lat() -> f64 {
    40.7580
}

fn default_store_lon() -> f64 {
    -73.9855
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            lat: default_store_lat(),
            lon: default_store_lon(),
        }
    }
}

impl StoreSettings {
    pub fn location(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

// =============================================================================
// Pricing
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Sales tax in basis points (800 = 8%).
    #[serde(default)]
    pub tax_rate_bps: u32,

    /// Flat service fee per order, in cents.
    #[serde(default)]
    pub service_fee_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipSettings {
    #[serde(default = "default_tip_presets")]
    pub presets: Vec<u32>,

    #[serde(default = "default_tip_percent")]
    pub default_percent: u32,

    /// Largest delivery tip the courier accepts.
    #[serde(default = "default_delivery_cap")]
    pub delivery_cap_cents: i64,

    /// `false` lets delivery tips through uncapped.
    #[serde(default = "default_true")]
    pub delivery_cap_enabled: bool,
}

fn default_tip_presets() -> Vec<u32> {
    vec![10, 15, 18, 20, 25]
}

fn default_tip_percent() -> u32 {
    15
}

fn default_delivery_cap() -> i64 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for TipSettings {
    fn default() -> Self {
        TipSettings {
            presets: default_tip_presets(),
            default_percent: default_tip_percent(),
            delivery_cap_cents: default_delivery_cap(),
            delivery_cap_enabled: true,
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySettings {
    /// Hard delivery limit, positive when set. Defaults to the widest zone.
    #[serde(default)]
    pub service_radius_km: Option<f64>,

    #[serde(default = "default_zones")]
    pub zones: Vec<ZoneSettings>,
}

/// One `[[delivery.zones]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSettings {
    pub label: String,
    pub radius_km: f64,
    pub fee_cents: i64,
    #[serde(default)]
    pub min_order_cents: i64,
    #[serde(default = "default_eta")]
    pub eta_minutes: u32,
}

fn default_eta() -> u32 {
    30
}

impl ZoneSettings {
    fn new(label: &str, radius_km: f64, fee_cents: i64, min_order_cents: i64, eta_minutes: u32) -> Self {
        ZoneSettings {
            label: label.to_string(),
            radius_km,
            fee_cents,
            min_order_cents,
            eta_minutes,
        }
    }
}

impl From<&ZoneSettings> for ZoneTier {
    fn from(z: &ZoneSettings) -> Self {
        ZoneTier {
            label: z.label.clone(),
            radius_km: z.radius_km,
            fee_cents: z.fee_cents,
            min_order_cents: z.min_order_cents,
            eta_minutes: z.eta_minutes,
        }
    }
}

fn default_zones() -> Vec<ZoneSettings> {
    vec![
        ZoneSettings::new("Near", 3.0, 299, 1500, 25),
        ZoneSettings::new("Standard", 6.0, 499, 2000, 40),
        ZoneSettings::new("Extended", 10.0, 799, 3000, 55),
    ]
}

impl Default for DeliverySettings {
    fn default() -> Self {
        DeliverySettings {
            service_radius_km: None,
            zones: default_zones(),
        }
    }
}

// =============================================================================
// Orders & Lookups
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSettings {
    /// How long a placed order stays editable/cancellable.
    #[serde(default = "default_edit_window")]
    pub edit_window_secs: i64,
}

fn default_edit_window() -> i64 {
    storefront_core::edit_window::DEFAULT_EDIT_WINDOW_SECS
}

impl Default for OrderSettings {
    fn default() -> Self {
        OrderSettings {
            edit_window_secs: default_edit_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSettings {
    /// Upper bound on one geocode or promo lookup, retries included.
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,

    /// Initial retry delay for transient failures (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum retry delay (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_lookup_timeout() -> u64 {
    5
}
fn default_initial_backoff() -> u64 {
    100
}
fn default_max_backoff() -> u64 {
    1000
}

impl Default for LookupSettings {
    fn default() -> Self {
        LookupSettings {
            timeout_secs: default_lookup_timeout(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub tips: TipSettings,

    #[serde(default)]
    pub delivery: DeliverySettings,

    #[serde(default)]
    pub orders: OrderSettings,

    #[serde(default)]
    pub lookups: LookupSettings,

    /// Promo records served by the in-memory directory. Keys follow the
    /// promo JSON record (`discountType`, `startDate`, ...).
    #[serde(default)]
    pub promos: Vec<Promo>,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CheckoutResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> CheckoutResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CheckoutResult<()> {
        validate_tax_rate(Rate::from_bps(self.pricing.tax_rate_bps))
            .map_err(|e| CheckoutError::InvalidConfig(e.to_string()))?;

        if self.pricing.service_fee_cents < 0 {
            return Err(CheckoutError::InvalidConfig(
                "service_fee_cents must not be negative".into(),
            ));
        }

        if !self.store.location().is_valid() {
            return Err(CheckoutError::InvalidConfig(format!(
                "store location ({}, {}) is not a valid coordinate",
                self.store.lat, self.store.lon
            )));
        }

        if self.tips.presets.is_empty() {
            return Err(CheckoutError::InvalidConfig(
                "tips.presets must not be empty".into(),
            ));
        }

        if self.tips.delivery_cap_cents < 0 {
            return Err(CheckoutError::InvalidConfig(
                "tips.delivery_cap_cents must not be negative".into(),
            ));
        }

        if self.delivery.zones.is_empty() {
            return Err(CheckoutError::InvalidConfig(
                "at least one delivery zone is required".into(),
            ));
        }

        for zone in &self.delivery.zones {
            if !(zone.radius_km.is_finite() && zone.radius_km > 0.0) {
                return Err(CheckoutError::InvalidConfig(format!(
                    "zone '{}' must have a positive radius",
                    zone.label
                )));
            }
            if zone.fee_cents < 0 || zone.min_order_cents < 0 {
                return Err(CheckoutError::InvalidConfig(format!(
                    "zone '{}' has a negative fee or minimum",
                    zone.label
                )));
            }
        }

        if let Some(radius) = self.delivery.service_radius_km {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(CheckoutError::InvalidConfig(format!(
                    "delivery.service_radius_km must be a positive distance, got {}",
                    radius
                )));
            }
        }

        for promo in &self.promos {
            validate_promo(promo).map_err(|e| {
                CheckoutError::InvalidConfig(format!("promo '{}': {}", promo.code, e))
            })?;
        }

        if self.orders.edit_window_secs <= 0 {
            return Err(CheckoutError::InvalidConfig(
                "orders.edit_window_secs must be greater than 0".into(),
            ));
        }

        if self.lookups.timeout_secs == 0 {
            return Err(CheckoutError::InvalidConfig(
                "lookups.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STOREFRONT_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key/value source.
    fn apply_overrides_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Tax rate, as a percentage ("8.25")
        if let Some(raw) = var("STOREFRONT_TAX_RATE") {
            match raw.trim().parse().ok().and_then(Rate::from_decimal_percent) {
                Some(rate) => {
                    debug!(%rate, "Overriding tax rate from environment");
                    self.pricing.tax_rate_bps = rate.bps();
                }
                None => warn!(value = %raw, "Ignoring invalid STOREFRONT_TAX_RATE"),
            }
        }

        // Delivery tip cap, in currency units ("50.00"), or "off"
        if let Some(raw) = var("STOREFRONT_DELIVERY_TIP_CAP") {
            let raw = raw.trim();
            if raw.eq_ignore_ascii_case("off") || raw.eq_ignore_ascii_case("none") {
                debug!("Disabling delivery tip cap from environment");
                self.tips.delivery_cap_enabled = false;
            } else {
                match raw.parse() {
                    Ok(units) => {
                        let cap = Money::from_decimal_units(units);
                        debug!(%cap, "Overriding delivery tip cap from environment");
                        self.tips.delivery_cap_cents = cap.cents();
                        self.tips.delivery_cap_enabled = true;
                    }
                    Err(_) => warn!(value = %raw, "Ignoring invalid STOREFRONT_DELIVERY_TIP_CAP"),
                }
            }
        }

        // Edit window
        if let Some(raw) = var("STOREFRONT_EDIT_WINDOW_SECS") {
            match raw.trim().parse::<i64>() {
                Ok(secs) => {
                    debug!(secs, "Overriding edit window from environment");
                    self.orders.edit_window_secs = secs;
                }
                Err(_) => warn!(value = %raw, "Ignoring invalid STOREFRONT_EDIT_WINDOW_SECS"),
            }
        }

        // Store location
        if let Some(lat) = var("STOREFRONT_STORE_LAT").and_then(|v| v.trim().parse::<f64>().ok()) {
            self.store.lat = lat;
        }
        if let Some(lon) = var("STOREFRONT_STORE_LON").and_then(|v| v.trim().parse::<f64>().ok()) {
            self.store.lon = lon;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.pricing.tax_rate_bps)
    }

    pub fn tip_policy(&self) -> TipPolicy {
        TipPolicy {
            presets: self.tips.presets.clone(),
            default_percent: self.tips.default_percent,
            delivery_cap: self
                .tips
                .delivery_cap_enabled
                .then(|| Money::from_cents(self.tips.delivery_cap_cents)),
        }
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            tax_rate: self.tax_rate(),
            service_fee: Money::from_cents(self.pricing.service_fee_cents),
            tip: self.tip_policy(),
        }
    }

    pub fn zone_table(&self) -> ZoneTable {
        let tiers = self.delivery.zones.iter().map(ZoneTier::from).collect();
        let table = ZoneTable::new(self.store.location(), tiers);
        match self.delivery.service_radius_km {
            Some(radius) => table.with_service_radius(radius),
            None => table,
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookups.timeout_secs)
    }

    pub fn edit_window_secs(&self) -> i64 {
        self.orders.edit_window_secs
    }
}
