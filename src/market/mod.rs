//! Market discovery module
//!
//! Resolves the configured search query to the single binary market the bot
//! quotes. The bot always quotes the market's primary ("yes") outcome.

use crate::error::ErrorKind;
use crate::exchange::{ExchangeClient, ExchangeError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A binary prediction market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Venue market identifier (condition id, ticker or slug)
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Identifier of the primary outcome whose book the bot quotes
    pub outcome_id: String,
    /// Last traded / displayed price of the primary outcome
    pub last_price: Option<Decimal>,
    /// Traded volume in dollars, if the venue reports it
    pub volume: Option<Decimal>,
    /// Resting liquidity in dollars, if the venue reports it
    pub liquidity: Option<Decimal>,
}

/// Market selection failures
#[derive(Debug, Error)]
pub enum MarketSelectionError {
    /// Search returned nothing
    #[error("No markets found for query: {query}")]
    NoMarkets { query: String },
    /// Configured index past the end of the results
    #[error("Market index {index} out of range (found {found} markets)")]
    IndexOutOfRange { index: usize, found: usize },
    /// The search itself failed
    #[error("Market search failed: {0}")]
    Exchange(#[from] ExchangeError),
}

impl MarketSelectionError {
    /// Classify the failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketSelectionError::NoMarkets { .. } | MarketSelectionError::IndexOutOfRange { .. } => {
                ErrorKind::Configuration
            }
            MarketSelectionError::Exchange(e) => e.kind(),
        }
    }
}

/// Search for markets and pick the one at `index`
pub async fn select_market(
    client: &dyn ExchangeClient,
    query: &str,
    index: usize,
) -> Result<Market, MarketSelectionError> {
    tracing::info!(query, venue = client.name(), "Searching for markets");

    let mut markets = client.find_markets(query).await?;
    if markets.is_empty() {
        return Err(MarketSelectionError::NoMarkets {
            query: query.to_string(),
        });
    }
    if index >= markets.len() {
        return Err(MarketSelectionError::IndexOutOfRange {
            index,
            found: markets.len(),
        });
    }

    let market = markets.swap_remove(index);
    tracing::info!(
        market = %market.id,
        outcome = %market.outcome_id,
        title = %market.title,
        last_price = ?market.last_price,
        "Selected market"
    );
    Ok(market)
}
