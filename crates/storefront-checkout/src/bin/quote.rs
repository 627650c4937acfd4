//! # Quote Calculator
//!
//! Prices a cart described in a JSON file and prints the quote.
//!
//! ## Usage
//! ```bash
//! cargo run -p storefront-checkout --bin storefront-quote -- cart.json
//!
//! # With an explicit config file
//! cargo run -p storefront-checkout --bin storefront-quote -- cart.json --config ./storefront.toml
//! ```
//!
//! ## Request Format
//! ```json
//! {
//!   "items": [
//!     { "item": { "sku": "SALMON", "name": "Salmon", "unitPriceCents": 999, "priceUnit": "lb" },
//!       "qty": "1.5" }
//!   ],
//!   "tip": { "mode": "percent", "value": "15" },
//!   "fulfillment": "delivery",
//!   "address": "350 Fifth Ave",
//!   "coordinates": { "lat": 40.7484, "lon": -73.9857 },
//!   "promoCode": "SAVE10"
//! }
//! ```
//!
//! The quote goes to stdout as pretty JSON. An address that cannot be
//! served still yields a quote, carrying the `noDeliveryZone` blocker. On
//! any other failure an error object with `code`, `message` and `retryable`
//! is printed instead and the exit code is 1.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use serde::Deserialize;
use storefront_checkout::{
    init_tracing, CheckoutError, CheckoutResult, CheckoutSession, ErrorResponse, StaticGeocoder,
    StaticPromoDirectory, StorefrontConfig,
};
use storefront_core::tip::TipSelection;
use storefront_core::{
    CatalogItem, Coordinates, CoreError, CustomerHistory, FulfillmentType, Modifier, Quantity,
    Quote,
};
use tracing::{debug, info, warn};

/// Address key used when the request carries coordinates but no address.
const PINNED_LOCATION: &str = "pinned location";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRequest {
    items: Vec<RequestLine>,

    #[serde(default)]
    tip: Option<TipSelection>,

    #[serde(default)]
    fulfillment: FulfillmentType,

    #[serde(default)]
    address: Option<String>,

    /// Pre-geocoded delivery location.
    #[serde(default)]
    coordinates: Option<Coordinates>,

    #[serde(default)]
    promo_code: Option<String>,

    #[serde(default)]
    history: Option<CustomerHistory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestLine {
    item: CatalogItem,
    qty: Quantity,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default)]
    note: Option<String>,
}

struct Args {
    cart_path: PathBuf,
    config_path: Option<PathBuf>,
}

fn print_usage() {
    println!("Storefront Quote Calculator");
    println!();
    println!("Usage: storefront-quote <cart.json> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Config file (default: platform config dir)");
    println!("  -h, --help           Show this help message");
}

/// Returns `None` when help was requested.
fn parse_args(args: &[String]) -> CheckoutResult<Option<Args>> {
    let mut cart_path = None;
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args.get(i + 1).ok_or_else(|| {
                    CheckoutError::InvalidRequest("--config needs a path".into())
                })?;
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            other if cart_path.is_none() => cart_path = Some(PathBuf::from(other)),
            other => {
                return Err(CheckoutError::InvalidRequest(format!(
                    "unexpected argument '{}'",
                    other
                )))
            }
        }
        i += 1;
    }

    let cart_path = cart_path
        .ok_or_else(|| CheckoutError::InvalidRequest("missing cart file argument".into()))?;
    Ok(Some(Args {
        cart_path,
        config_path,
    }))
}

async fn run(args: Args) -> CheckoutResult<Quote> {
    let config = StorefrontConfig::load(args.config_path)?;
    let contents = std::fs::read_to_string(&args.cart_path)
        .map_err(|e| CheckoutError::InvalidRequest(format!("{}: {}", args.cart_path.display(), e)))?;
    let request: QuoteRequest = serde_json::from_str(&contents)?;
    debug!(lines = request.items.len(), "Parsed quote request");

    quote_request(&config, request).await
}

async fn quote_request(config: &StorefrontConfig, request: QuoteRequest) -> CheckoutResult<Quote> {
    let address = request
        .address
        .clone()
        .or_else(|| request.coordinates.map(|_| PINNED_LOCATION.to_string()));

    let mut geocoder = StaticGeocoder::new();
    if let (Some(address), Some(coords)) = (&address, request.coordinates) {
        geocoder.insert(address, coords);
    }
    let promos = StaticPromoDirectory::new(config.promos.clone());

    let session = CheckoutSession::new(config, geocoder, promos)
        .with_history(request.history.unwrap_or_default());

    for line in request.items {
        session.add_item(&line.item, line.qty, line.modifiers, line.note)?;
    }
    if let Some(tip) = request.tip {
        session.set_tip(tip);
    }
    session.set_fulfillment(request.fulfillment);

    if request.fulfillment.is_delivery() {
        if let Some(address) = &address {
            match session.resolve_address(address).await {
                Ok(_) => {}
                // the session has already cleared the zone, so the quote reports it
                Err(CheckoutError::Core(CoreError::Zone(err))) => {
                    warn!(code = err.code(), %address, "Delivery address not serviceable");
                }
                Err(err) => return Err(err),
            }
        }
    }

    if let Some(code) = &request.promo_code {
        session.apply_promo_code(code).await?;
    }

    let quote = session.quote();
    info!(
        total = %quote.totals.grand_total,
        can_checkout = quote.can_checkout(),
        "Quote computed"
    );
    Ok(quote)
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let result = match parse_args(&args) {
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Ok(Some(args)) => run(args).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(quote) => print_json(&quote),
        Err(e) => {
            print_json(&ErrorResponse::from(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::CheckoutBlocker;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("storefront-quote")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(&args(&["cart.json", "--config", "sf.toml"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.cart_path, PathBuf::from("cart.json"));
        assert_eq!(parsed.config_path, Some(PathBuf::from("sf.toml")));

        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.json", "b.json"])).is_err());
        assert!(parse_args(&args(&["a.json", "--config"])).is_err());
    }

    #[tokio::test]
    async fn test_delivery_quote_from_json() {
        let mut config = StorefrontConfig::default();
        config.pricing.tax_rate_bps = 800;

        let request: QuoteRequest = serde_json::from_str(
            r#"{
                "items": [
                    { "item": { "sku": "PIZZA", "name": "Margherita", "unitPriceCents": 1200 },
                      "qty": "2",
                      "modifiers": [{ "name": "Extra cheese", "priceCents": 150 }] }
                ],
                "tip": { "mode": "amount", "value": "5.00" },
                "fulfillment": "delivery",
                "coordinates": { "lat": 40.7484, "lon": -73.9857 }
            }"#,
        )
        .unwrap();

        let quote = quote_request(&config, request).await.unwrap();
        assert_eq!(quote.totals.subtotal.cents(), 2700);
        assert_eq!(quote.totals.tax.cents(), 216);
        assert_eq!(quote.totals.tips.cents(), 500);
        assert_eq!(quote.totals.delivery_fee.cents(), 299);
        assert_eq!(quote.totals.grand_total.cents(), 2700 + 216 + 500 + 299);
        assert!(quote.can_checkout());
    }

    #[tokio::test]
    async fn test_unserviceable_address_still_quotes() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{
                "items": [{ "item": { "sku": "TEA", "name": "Tea", "unitPriceCents": 300 }, "qty": "1" }],
                "fulfillment": "delivery",
                "coordinates": { "lat": 51.5074, "lon": -0.1278 }
            }"#,
        )
        .unwrap();

        let quote = quote_request(&StorefrontConfig::default(), request).await.unwrap();
        assert!(!quote.can_checkout());
        assert!(quote.blockers.contains(&CheckoutBlocker::NoDeliveryZone));
        assert_eq!(quote.totals.delivery_fee.cents(), 0);
        assert_eq!(quote.totals.subtotal.cents(), 300);
    }

    #[tokio::test]
    async fn test_unknown_address_still_quotes() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{
                "items": [{ "item": { "sku": "TEA", "name": "Tea", "unitPriceCents": 300 }, "qty": "1" }],
                "fulfillment": "delivery",
                "address": "nowhere in particular"
            }"#,
        )
        .unwrap();

        let quote = quote_request(&StorefrontConfig::default(), request).await.unwrap();
        assert!(quote.blockers.contains(&CheckoutBlocker::NoDeliveryZone));
    }

    #[test]
    fn test_float_quantity_is_rejected() {
        let parsed = serde_json::from_str::<QuoteRequest>(
            r#"{ "items": [{ "item": { "sku": "TEA", "name": "Tea", "unitPriceCents": 300 }, "qty": 1.5 }] }"#,
        );
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_unknown_promo_fails_request() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{
                "items": [{ "item": { "sku": "TEA", "name": "Tea", "unitPriceCents": 300 }, "qty": "1" }],
                "promoCode": "NOPE"
            }"#,
        )
        .unwrap();

        let err = quote_request(&StorefrontConfig::default(), request)
            .await
            .unwrap_err();
        assert_eq!(ErrorResponse::from(&err).code, "PROMO_INVALID");
    }
}
