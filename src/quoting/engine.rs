//! Inventory-aware quote computation
//!
//! Quotes are centered on the fair price shifted by an inventory skew:
//!
//! ```text
//! skew          = -inventory * inventory_adjustment_factor
//! adjusted_fair = fair_price + skew
//! bid, ask      = adjusted_fair -/+ target_spread / 2
//! ```
//!
//! Both prices are clamped to `[MIN_PRICE, MAX_PRICE]`. When clamping eats
//! into the spread, the quote is rebuilt around the clamped midpoint at
//! `min_spread`, sliding toward the open side when a bound is in the way.
//! The spread only ends up below `min_spread` when it is wider than the
//! whole price range, in which case the quote spans `[MIN_PRICE, MAX_PRICE]`.

use super::{Quote, MAX_PRICE, MIN_PRICE};
use crate::config::{Config, SkewMode};
use rust_decimal::Decimal;

/// Parameters the engine needs, extracted from the config
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteParams {
    pub target_spread: Decimal,
    pub min_spread: Decimal,
    pub order_size: u64,
    pub inventory_adjustment_factor: Decimal,
    pub rebalance_threshold: u64,
    pub skew_mode: SkewMode,
}

impl From<&Config> for QuoteParams {
    fn from(config: &Config) -> Self {
        Self {
            target_spread: config.quoting.target_spread,
            min_spread: config.quoting.min_spread,
            order_size: config.quoting.order_size,
            inventory_adjustment_factor: config.quoting.inventory_adjustment_factor,
            rebalance_threshold: config.inventory.rebalance_threshold,
            skew_mode: config.quoting.skew_mode,
        }
    }
}

/// Pure quote calculator
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    params: QuoteParams,
}

impl QuoteEngine {
    pub fn new(params: QuoteParams) -> Self {
        Self { params }
    }

    /// Price shift for the given inventory
    ///
    /// Long inventory yields a negative skew (cheaper quotes, more sells),
    /// short inventory a positive one.
    pub fn skew(&self, inventory: i64) -> Decimal {
        if self.params.skew_mode == SkewMode::Deadband
            && inventory.unsigned_abs() <= self.params.rebalance_threshold
        {
            return Decimal::ZERO;
        }
        -Decimal::from(inventory) * self.params.inventory_adjustment_factor
    }

    /// Compute a bounded, spread-compliant quote
    pub fn compute_quotes(&self, fair_price: Decimal, inventory: i64) -> Quote {
        let adjusted_fair = fair_price + self.skew(inventory);
        let half_spread = self.params.target_spread / Decimal::TWO;

        let mut bid = clamp_price(adjusted_fair - half_spread);
        let mut ask = clamp_price(adjusted_fair + half_spread);

        if ask - bid < self.params.min_spread {
            (bid, ask) = widen_to_min_spread(bid, ask, self.params.min_spread);
        }

        Quote {
            bid_price: bid,
            ask_price: ask,
            size: self.params.order_size,
        }
    }
}

fn clamp_price(price: Decimal) -> Decimal {
    price.max(MIN_PRICE).min(MAX_PRICE)
}

/// Rebuild a too-narrow quote around its midpoint without leaving the bounds
fn widen_to_min_spread(bid: Decimal, ask: Decimal, min_spread: Decimal) -> (Decimal, Decimal) {
    let spread = min_spread.min(MAX_PRICE - MIN_PRICE);
    let mid = (bid + ask) / Decimal::TWO;
    let half = spread / Decimal::TWO;

    let (bid, ask) = (mid - half, mid + half);
    if bid < MIN_PRICE {
        (MIN_PRICE, MIN_PRICE + spread)
    } else if ask > MAX_PRICE {
        (MAX_PRICE - spread, MAX_PRICE)
    } else {
        (bid, ask)
    }
}
