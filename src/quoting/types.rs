//! Quote types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Lowest price the bot will ever quote
pub const MIN_PRICE: Decimal = dec!(0.01);
/// Highest price the bot will ever quote
pub const MAX_PRICE: Decimal = dec!(0.99);

/// A two-sided quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Buy-side price
    pub bid_price: Decimal,
    /// Sell-side price
    pub ask_price: Decimal,
    /// Contracts on each side
    pub size: u64,
}

impl Quote {
    /// Distance between ask and bid
    pub fn spread(&self) -> Decimal {
        self.ask_price - self.bid_price
    }
}
