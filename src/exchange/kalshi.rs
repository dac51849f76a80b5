//! Kalshi market data client
//!
//! Uses the public trade API v2. Kalshi quotes in cents and only publishes
//! resting bids for each side; YES asks are implied by NO bids
//! (`yes_ask = 100 - no_bid`).

use super::http::{build_client, cents, get_json, matches_query, REQUEST_TIMEOUT};
use super::{ExchangeClient, ExchangeError, Fill, OrderId, Side};
use crate::market::Market;
use crate::orderbook::{OrderBook, PriceLevel};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Kalshi trade API base URL
pub const KALSHI_API_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";

const VENUE: &str = "kalshi";

/// Configuration for the Kalshi client
#[derive(Debug, Clone)]
pub struct KalshiConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Open markets scanned per search
    pub scan_limit: u32,
}

impl Default for KalshiConfig {
    fn default() -> Self {
        Self {
            base_url: KALSHI_API_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            scan_limit: 1000,
        }
    }
}

/// Read-only Kalshi client
pub struct KalshiClient {
    config: KalshiConfig,
    client: Client,
}

impl KalshiClient {
    pub fn new() -> Result<Self, ExchangeError> {
        Self::with_config(KalshiConfig::default())
    }

    pub fn with_config(config: KalshiConfig) -> Result<Self, ExchangeError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ExchangeClient for KalshiClient {
    fn name(&self) -> &'static str {
        VENUE
    }

    async fn find_markets(&self, query: &str) -> Result<Vec<Market>, ExchangeError> {
        let url = format!("{}/markets", self.config.base_url);
        let limit = self.config.scan_limit.to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("status", "open"), ("limit", limit.as_str())]);

        let response: MarketsResponse = get_json(VENUE, request).await?.unwrap_or_default();
        let markets: Vec<Market> = response
            .markets
            .into_iter()
            .filter(|m| {
                matches_query(
                    query,
                    &[
                        m.ticker.as_str(),
                        m.title.as_str(),
                        m.yes_sub_title.as_deref().unwrap_or(""),
                    ],
                )
            })
            .map(convert_to_market)
            .collect();

        tracing::debug!(count = markets.len(), query, "Kalshi search complete");
        Ok(markets)
    }

    async fn fetch_order_book(&self, market: &Market) -> Result<Option<OrderBook>, ExchangeError> {
        let url = format!("{}/markets/{}/orderbook", self.config.base_url, market.id);
        let response: Option<OrderbookResponse> = get_json(VENUE, self.client.get(&url)).await?;
        Ok(response.map(|r| convert_book(&market.outcome_id, r.orderbook)))
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

#[derive(Debug, Default, Deserialize)]
struct MarketsResponse {
    #[serde(default)]
    markets: Vec<KalshiMarket>,
}

#[derive(Debug, Deserialize)]
struct KalshiMarket {
    ticker: String,
    title: String,
    yes_sub_title: Option<String>,
    /// Cents
    last_price: Option<i64>,
    /// Contracts
    volume: Option<i64>,
    /// Cents
    liquidity: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OrderbookResponse {
    orderbook: KalshiBook,
}

/// Each level is `[price_cents, quantity]`; sides may be null when empty
#[derive(Debug, Default, Deserialize)]
struct KalshiBook {
    yes: Option<Vec<[i64; 2]>>,
    no: Option<Vec<[i64; 2]>>,
}

fn convert_to_market(m: KalshiMarket) -> Market {
    let title = match m.yes_sub_title {
        Some(sub) if !sub.is_empty() => format!("{} ({})", m.title, sub),
        _ => m.title,
    };
    Market {
        outcome_id: format!("{}:yes", m.ticker),
        id: m.ticker,
        title,
        last_price: m.last_price.filter(|p| *p > 0).map(cents),
        volume: m.volume.map(Decimal::from),
        liquidity: m.liquidity.map(cents),
    }
}

fn convert_book(outcome_id: &str, book: KalshiBook) -> OrderBook {
    let bids = book
        .yes
        .unwrap_or_default()
        .into_iter()
        .map(|[price, qty]| PriceLevel::new(cents(price), Decimal::from(qty)))
        .collect();
    let asks = book
        .no
        .unwrap_or_default()
        .into_iter()
        .map(|[price, qty]| PriceLevel::new(cents(100 - price), Decimal::from(qty)))
        .collect();
    OrderBook::from_levels(outcome_id, bids, asks)
}
