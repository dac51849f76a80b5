//! Exchange module
//!
//! The capability interface the quoting core consumes, one concrete client
//! per venue, and the dry-run wrapper that simulates order entry.

mod http;
mod kalshi;
mod limitless;
mod paper;
mod polymarket;
mod types;

pub use kalshi::KalshiClient;
pub use limitless::LimitlessClient;
pub use paper::DryRunExchange;
pub use polymarket::PolymarketClient;
pub use types::{ExchangeError, Fill, OrderId, Side};

use crate::config::{Config, ConfigError, Platform};
use crate::market::Market;
use crate::orderbook::OrderBook;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Venue capabilities used by the market maker
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Venue name for logging
    fn name(&self) -> &'static str;

    /// Whether `place_order`/`cancel_order`/`fetch_fills` are backed by a real implementation
    fn supports_order_entry(&self) -> bool {
        false
    }

    /// Search markets, best matches first
    async fn find_markets(&self, query: &str) -> Result<Vec<Market>, ExchangeError>;

    /// Current book of the market's primary outcome; `None` when the venue has none
    async fn fetch_order_book(&self, market: &Market) -> Result<Option<OrderBook>, ExchangeError>;

    /// Signed position in the market's primary outcome
    async fn fetch_position(&self, market: &Market) -> Result<i64, ExchangeError>;

    /// Place a limit order
    async fn place_order(
        &self,
        market: &Market,
        side: Side,
        price: Decimal,
        size: u64,
    ) -> Result<OrderId, ExchangeError>;

    /// Cancel an order
    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), ExchangeError>;

    /// Executions on the given orders since the previous query
    async fn fetch_fills(&self, order_ids: &[OrderId]) -> Result<Vec<Fill>, ExchangeError>;
}

/// Build the market data client for a venue
pub fn build_market_data(platform: Platform) -> Result<Box<dyn ExchangeClient>, ConfigError> {
    let venue: Box<dyn ExchangeClient> = match platform {
        Platform::Polymarket => Box::new(PolymarketClient::new().map_err(ConfigError::Client)?),
        Platform::Kalshi => Box::new(KalshiClient::new().map_err(ConfigError::Client)?),
        Platform::Limitless => Box::new(LimitlessClient::new().map_err(ConfigError::Client)?),
    };
    Ok(venue)
}

/// Build the client for the configured venue
///
/// Venue clients only implement market data, so live trading is refused
/// here, before any cycle runs.
pub fn build_exchange(config: &Config) -> Result<Arc<dyn ExchangeClient>, ConfigError> {
    let venue = build_market_data(config.platform)?;

    if config.runtime.dry_run {
        tracing::warn!(venue = venue.name(), "DRY RUN MODE - no real orders will be sent");
        return Ok(Arc::new(DryRunExchange::new(venue)));
    }

    if !venue.supports_order_entry() {
        return Err(ConfigError::LiveTradingUnavailable(config.platform));
    }
    Ok(Arc::from(venue))
}

#[async_trait]
impl<T: ExchangeClient + ?Sized> ExchangeClient for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supports_order_entry(&self) -> bool {
        (**self).supports_order_entry()
    }

    async fn find_markets(&self, query: &str) -> Result<Vec<Market>, ExchangeError> {
        (**self).find_markets(query).await
    }

    async fn fetch_order_book(&self, market: &Market) -> Result<Option<OrderBook>, ExchangeError> {
        (**self).fetch_order_book(market).await
    }

    async fn fetch_position(&self, market: &Market) -> Result<i64, ExchangeError> {
        (**self).fetch_position(market).await
    }

    async fn place_order(
        &self,
        market: &Market,
        side: Side,
        price: Decimal,
        size: u64,
    ) -> Result<OrderId, ExchangeError> {
        (**self).place_order(market, side, price, size).await
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), ExchangeError> {
        (**self).cancel_order(order_id).await
    }

    async fn fetch_fills(&self, order_ids: &[OrderId]) -> Result<Vec<Fill>, ExchangeError> {
        (**self).fetch_fills(order_ids).await
    }
}
