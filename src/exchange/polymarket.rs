//! Polymarket market data client
//!
//! Market search goes through the Gamma API; books come from the CLOB REST
//! endpoint. The first CLOB token of a market is its YES outcome.

use super::http::{build_client, get_json, parse_decimal, REQUEST_TIMEOUT};
use super::{ExchangeClient, ExchangeError, Fill, OrderId, Side};
use crate::market::Market;
use crate::orderbook::{OrderBook, PriceLevel};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Gamma API base URL
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";
/// CLOB API base URL
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";

const VENUE: &str = "polymarket";

/// Configuration for the Polymarket client
#[derive(Debug, Clone)]
pub struct PolymarketConfig {
    pub gamma_url: String,
    pub clob_url: String,
    pub timeout: Duration,
    /// Maximum markets returned by a search
    pub search_limit: usize,
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            gamma_url: GAMMA_API_URL.to_string(),
            clob_url: CLOB_API_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            search_limit: 20,
        }
    }
}

/// Read-only Polymarket client
pub struct PolymarketClient {
    config: PolymarketConfig,
    client: Client,
}

impl PolymarketClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, ExchangeError> {
        Self::with_config(PolymarketConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: PolymarketConfig) -> Result<Self, ExchangeError> {
        let client = build_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ExchangeClient for PolymarketClient {
    fn name(&self) -> &'static str {
        VENUE
    }

    async fn find_markets(&self, query: &str) -> Result<Vec<Market>, ExchangeError> {
        let url = format!("{}/public-search", self.config.gamma_url);
        tracing::debug!(url = %url, query, "Searching Gamma API");

        let request = self
            .client
            .get(&url)
            .query(&[("q", query), ("events_status", "active")]);
        let response: SearchResponse = get_json(VENUE, request).await?.unwrap_or_default();

        let markets: Vec<Market> = response
            .events
            .into_iter()
            .flat_map(|e| e.markets)
            .filter(|m| m.active && !m.closed)
            .filter_map(|m| match convert_to_market(m) {
                Ok(market) => Some(market),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unusable Gamma market");
                    None
                }
            })
            .take(self.config.search_limit)
            .collect();

        tracing::debug!(count = markets.len(), "Gamma search complete");
        Ok(markets)
    }

    async fn fetch_order_book(&self, market: &Market) -> Result<Option<OrderBook>, ExchangeError> {
        let url = format!("{}/book", self.config.clob_url);
        let request = self
            .client
            .get(&url)
            .query(&[("token_id", market.outcome_id.as_str())]);

        let Some(book): Option<ClobBook> = get_json(VENUE, request).await? else {
            return Ok(None);
        };
        convert_book(&market.outcome_id, book).map(Some)
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
struct SearchResponse {
    #[serde(default)]
    events: Vec<GammaEvent>,
}

#[derive(Debug, Deserialize)]
struct GammaEvent {
    #[serde(default)]
    markets: Vec<GammaMarket>,
}

/// Raw market response from Gamma API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    condition_id: String,
    question: String,
    /// JSON-encoded array, YES token first
    clob_token_ids: Option<String>,
    /// JSON-encoded array of decimal strings
    outcome_prices: Option<String>,
    volume_num: Option<f64>,
    liquidity_num: Option<f64>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    closed: bool,
}

#[derive(Debug, Deserialize)]
struct ClobBook {
    #[serde(default)]
    bids: Vec<ClobLevel>,
    #[serde(default)]
    asks: Vec<ClobLevel>,
    last_trade_price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClobLevel {
    price: String,
    size: String,
}

fn convert_to_market(gamma: GammaMarket) -> Result<Market, ExchangeError> {
    let token_ids = gamma.clob_token_ids.as_deref().ok_or(ExchangeError::Decode {
        venue: VENUE,
        reason: "missing clobTokenIds".to_string(),
    })?;
    let yes_token_id = parse_yes_token(token_ids)?;

    Ok(Market {
        id: gamma.condition_id,
        title: gamma.question,
        outcome_id: yes_token_id,
        last_price: gamma.outcome_prices.as_deref().and_then(parse_outcome_price),
        volume: gamma.volume_num.and_then(Decimal::from_f64_retain),
        liquidity: gamma.liquidity_num.and_then(Decimal::from_f64_retain),
    })
}

/// Format: "[\"token1\", \"token2\"]" where token1 is YES
fn parse_yes_token(token_ids: &str) -> Result<String, ExchangeError> {
    let tokens: Vec<String> = serde_json::from_str(token_ids).map_err(|e| ExchangeError::Decode {
        venue: VENUE,
        reason: format!("invalid clobTokenIds {token_ids}: {e}"),
    })?;

    if tokens.len() < 2 {
        return Err(ExchangeError::Decode {
            venue: VENUE,
            reason: format!("expected 2 token ids, got {}", tokens.len()),
        });
    }
    Ok(tokens[0].clone())
}

/// Format: "[\"0.52\", \"0.48\"]" - returns the YES price
fn parse_outcome_price(prices: &str) -> Option<Decimal> {
    let prices: Vec<String> = serde_json::from_str(prices).ok()?;
    prices.first().and_then(|p| parse_decimal(VENUE, p).ok())
}

fn convert_book(outcome_id: &str, book: ClobBook) -> Result<OrderBook, ExchangeError> {
    let levels = |raw: Vec<ClobLevel>| -> Result<Vec<PriceLevel>, ExchangeError> {
        raw.into_iter()
            .map(|l| {
                Ok(PriceLevel::new(
                    parse_decimal(VENUE, &l.price)?,
                    parse_decimal(VENUE, &l.size)?,
                ))
            })
            .collect()
    };

    let last_price = book
        .last_trade_price
        .as_deref()
        .and_then(|p| parse_decimal(VENUE, p).ok());

    Ok(OrderBook::from_levels(outcome_id, levels(book.bids)?, levels(book.asks)?)
        .with_last_price(last_price))
}
