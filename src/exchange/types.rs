//! Exchange types

use crate::error::ErrorKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy the primary outcome
    Buy,
    /// Sell the primary outcome
    Sell,
}

impl Side {
    /// Signed multiplier applied to position on a fill
    pub fn sign(self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Venue-assigned order identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    /// Create a new order id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Underlying id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An execution reported by the exchange; may be partial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Order that was (partially) executed
    pub order_id: OrderId,
    /// Side of the executed order
    pub side: Side,
    /// Execution price
    pub price: Decimal,
    /// Executed contracts
    pub size: u64,
    /// When the bot observed the execution
    pub observed_at: DateTime<Utc>,
}

/// Failures raised by exchange collaborators
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Transport-level failure (timeout, DNS, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Venue answered with a non-success status
    #[error("{venue} API error: {status} - {body}")]
    Api {
        venue: &'static str,
        status: u16,
        body: String,
    },
    /// Response body did not have the expected shape
    #[error("Failed to decode {venue} response: {reason}")]
    Decode {
        venue: &'static str,
        reason: String,
    },
    /// Order is not known to the venue
    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),
    /// Capability not offered by this client
    #[error("{capability} is not supported by {venue}")]
    Unsupported {
        venue: &'static str,
        capability: &'static str,
    },
}

impl ExchangeError {
    /// Classify the failure for the step that observed it
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::Http(_) | ExchangeError::Api { .. } | ExchangeError::Decode { .. } => {
                ErrorKind::Transient
            }
            ExchangeError::UnknownOrder(_) => ErrorKind::Unavailable,
            ExchangeError::Unsupported { .. } => ErrorKind::Configuration,
        }
    }
}
