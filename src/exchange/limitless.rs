//! Limitless Exchange market data client
//!
//! Market prices are published as percentages; book levels carry prices in
//! dollars and sizes in base units of the collateral token.

use super::http::{build_client, get_json, REQUEST_TIMEOUT};
use super::{ExchangeClient, ExchangeError, Fill, OrderId, Side};
use crate::market::Market;
use crate::orderbook::{OrderBook, PriceLevel};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::time::Duration;

/// Limitless API base URL
pub const LIMITLESS_API_URL: &str = "https://api.limitless.exchange";

const VENUE: &str = "limitless";

/// Configuration for the Limitless client
#[derive(Debug, Clone)]
pub struct LimitlessConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Base units per contract in book sizes
    pub size_scale: Decimal,
    pub search_limit: usize,
}

impl Default for LimitlessConfig {
    fn default() -> Self {
        Self {
            base_url: LIMITLESS_API_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            size_scale: dec!(1000000),
            search_limit: 20,
        }
    }
}

/// Read-only Limitless client
pub struct LimitlessClient {
    config: LimitlessConfig,
    client: Client,
}

impl LimitlessClient {
    pub fn new() -> Result<Self, ExchangeError> {
        Self::with_config(LimitlessConfig::default())
    }

    pub fn with_config(config: LimitlessConfig) -> Result<Self, ExchangeError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ExchangeClient for LimitlessClient {
    fn name(&self) -> &'static str {
        VENUE
    }

    async fn find_markets(&self, query: &str) -> Result<Vec<Market>, ExchangeError> {
        let url = format!("{}/markets/search", self.config.base_url);
        let limit = self.config.search_limit.to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("query", query), ("limit", limit.as_str())]);

        let response: SearchResponse = get_json(VENUE, request).await?.unwrap_or_default();
        let markets: Vec<Market> = response
            .into_markets()
            .into_iter()
            .filter(|m| !m.expired)
            .map(convert_to_market)
            .take(self.config.search_limit)
            .collect();

        tracing::debug!(count = markets.len(), query, "Limitless search complete");
        Ok(markets)
    }

    async fn fetch_order_book(&self, market: &Market) -> Result<Option<OrderBook>, ExchangeError> {
        let url = format!("{}/markets/{}/orderbook", self.config.base_url, market.id);
        let response: Option<LimitlessBook> = get_json(VENUE, self.client.get(&url)).await?;
        Ok(response.map(|b| convert_book(&market.outcome_id, b, self.config.size_scale)))
    }

    async fn fetch_position(&self, _market: &Market) -> Result<i64, ExchangeError> {
        Err(unsupported("position queries"))
    }

    async fn place_order(
        &self,
        _market: &Market,
        _side: Side,
        _price: Decimal,
        _size: u64,
    ) -> Result<OrderId, ExchangeError> {
        Err(unsupported("order entry"))
    }

    async fn cancel_order(&self, _order_id: &OrderId) -> Result<(), ExchangeError> {
        Err(unsupported("order entry"))
    }

    async fn fetch_fills(&self, _order_ids: &[OrderId]) -> Result<Vec<Fill>, ExchangeError> {
        Err(unsupported("fill queries"))
    }
}

fn unsupported(capability: &'static str) -> ExchangeError {
    ExchangeError::Unsupported {
        venue: VENUE,
        capability,
    }
}

/// The search endpoint answers either a bare list or `{ "markets": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { markets: Vec<LimitlessMarket> },
    Bare(Vec<LimitlessMarket>),
}

impl Default for SearchResponse {
    fn default() -> Self {
        SearchResponse::Bare(vec![])
    }
}

impl SearchResponse {
    fn into_markets(self) -> Vec<LimitlessMarket> {
        match self {
            SearchResponse::Wrapped { markets } | SearchResponse::Bare(markets) => markets,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LimitlessMarket {
    slug: String,
    title: String,
    /// `[yes, no]` in percent
    #[serde(default)]
    prices: Vec<Decimal>,
    #[serde(default)]
    volume_formatted: Option<Decimal>,
    #[serde(default)]
    liquidity_formatted: Option<Decimal>,
    #[serde(default)]
    expired: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LimitlessBook {
    #[serde(default)]
    bids: Vec<LimitlessLevel>,
    #[serde(default)]
    asks: Vec<LimitlessLevel>,
    last_trade_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct LimitlessLevel {
    price: Decimal,
    size: Decimal,
}

fn convert_to_market(m: LimitlessMarket) -> Market {
    Market {
        outcome_id: format!("{}:yes", m.slug),
        id: m.slug,
        title: m.title,
        last_price: m.prices.first().map(|p| *p / dec!(100)),
        volume: m.volume_formatted,
        liquidity: m.liquidity_formatted,
    }
}

fn convert_book(outcome_id: &str, book: LimitlessBook, size_scale: Decimal) -> OrderBook {
    let levels = |raw: Vec<LimitlessLevel>| -> Vec<PriceLevel> {
        raw.into_iter()
            .map(|l| PriceLevel::new(l.price, l.size / size_scale))
            .collect()
    };
    OrderBook::from_levels(outcome_id, levels(book.bids), levels(book.asks))
        .with_last_price(book.last_trade_price)
}
