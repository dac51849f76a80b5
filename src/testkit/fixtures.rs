//! Canonical test values

use crate::config::Config;
use crate::market::Market;
use crate::orderbook::{OrderBook, PriceLevel};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Config used across lifecycle tests
///
/// target 0.04, min 0.02, size 10, factor 0.001, max inventory 20,
/// threshold 10, linear skew, dry run.
pub const TEST_CONFIG: &str = r#"
platform = "polymarket"

[market]
query = "election"

[quoting]
target_spread = 0.04
min_spread = 0.02
order_size = 10
inventory_adjustment_factor = 0.001

[inventory]
max_inventory = 20
rebalance_threshold = 10

[runtime]
update_interval_secs = 5
"#;

/// Parsed `TEST_CONFIG`
pub fn test_config() -> Config {
    match Config::from_toml_str(TEST_CONFIG) {
        Ok(config) => config,
        Err(e) => panic!("test config must be valid: {e}"),
    }
}

/// A market with an optional platform-reported price
pub fn market(id: &str, last_price: Option<Decimal>) -> Market {
    Market {
        id: id.to_string(),
        title: format!("Test market {id}"),
        outcome_id: format!("{id}-yes"),
        last_price,
        volume: Some(dec!(10000)),
        liquidity: Some(dec!(2500)),
    }
}

/// Single-level book with the same size on both sides
pub fn book(outcome_id: &str, bid: Decimal, ask: Decimal, size: Decimal) -> OrderBook {
    OrderBook::from_levels(
        outcome_id,
        vec![PriceLevel::new(bid, size)],
        vec![PriceLevel::new(ask, size)],
    )
}
