//! FIFO pairing of buy and sell fills into round trips

use crate::exchange::{Fill, Side};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::VecDeque;

/// A matched buy and sell of equal quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTrip {
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub size: u64,
    pub profit: Decimal,
}

#[derive(Debug, Clone)]
struct Lot {
    price: Decimal,
    remaining: u64,
}

/// Pairs the oldest unmatched bought quantity with the oldest unmatched sold one
#[derive(Debug, Clone, Default)]
pub struct RoundTripMatcher {
    buys: VecDeque<Lot>,
    sells: VecDeque<Lot>,
}

impl RoundTripMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fill and return every round trip it completes
    pub fn push(&mut self, fill: &Fill) -> Vec<RoundTrip> {
        if fill.size == 0 {
            return vec![];
        }

        let lot = Lot {
            price: fill.price,
            remaining: fill.size,
        };
        match fill.side {
            Side::Buy => self.buys.push_back(lot),
            Side::Sell => self.sells.push_back(lot),
        }

        let mut trips = Vec::new();
        while let (Some(buy), Some(sell)) = (self.buys.front_mut(), self.sells.front_mut()) {
            let size = buy.remaining.min(sell.remaining);
            trips.push(RoundTrip {
                buy_price: buy.price,
                sell_price: sell.price,
                size,
                profit: (sell.price - buy.price) * Decimal::from(size),
            });

            buy.remaining -= size;
            sell.remaining -= size;
            if buy.remaining == 0 {
                self.buys.pop_front();
            }
            if sell.remaining == 0 {
                self.sells.pop_front();
            }
        }
        trips
    }

    /// Bought contracts not yet matched
    pub fn unmatched_buys(&self) -> u64 {
        self.buys.iter().map(|l| l.remaining).sum()
    }

    /// Sold contracts not yet matched
    pub fn unmatched_sells(&self) -> u64 {
        self.sells.iter().map(|l| l.remaining).sum()
    }
}
