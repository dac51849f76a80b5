//! Scripted in-memory exchange
//!
//! Orders placed through [`FakeExchange`] rest until cancelled. Fills are
//! scripted per side with [`FakeExchange::script_fill`] and delivered on the
//! next fill query, to the last order of that side in the queried ids.
//! Failures are scripted per capability and consumed one call at a time.

use crate::exchange::{ExchangeClient, ExchangeError, Fill, OrderId, Side};
use crate::market::Market;
use crate::orderbook::OrderBook;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

const VENUE: &str = "fake";

/// An order as the fake venue saw it
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Decimal,
    pub size: u64,
}

#[derive(Debug, Default)]
struct FakeState {
    markets: Vec<Market>,
    book: Option<OrderBook>,
    position: i64,
    next_id: u64,
    resting: Vec<PlacedOrder>,
    placed: Vec<PlacedOrder>,
    cancelled: Vec<OrderId>,
    filled: HashMap<OrderId, u64>,
    fill_queries: Vec<Vec<OrderId>>,
    scripted_fills: VecDeque<(Side, u64)>,
    placement_failures: VecDeque<Side>,
    cancel_failures: usize,
    book_failures: usize,
    fill_query_failures: usize,
    position_failures: usize,
}

/// Scripted `ExchangeClient` for deterministic lifecycle tests
#[derive(Debug, Default)]
pub struct FakeExchange {
    state: Mutex<FakeState>,
}

impl FakeExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markets(self, markets: Vec<Market>) -> Self {
        self.state().markets = markets;
        self
    }

    pub fn with_book(self, book: OrderBook) -> Self {
        self.state().book = Some(book);
        self
    }

    pub fn with_position(self, position: i64) -> Self {
        self.state().position = position;
        self
    }

    pub fn set_book(&self, book: Option<OrderBook>) {
        self.state().book = book;
    }

    pub fn set_position(&self, position: i64) {
        self.state().position = position;
    }

    /// Deliver a fill of `size` on the last queried order of `side`
    pub fn script_fill(&self, side: Side, size: u64) {
        self.state().scripted_fills.push_back((side, size));
    }

    /// Reject the next placement on `side`
    pub fn fail_next_placement(&self, side: Side) {
        self.state().placement_failures.push_back(side);
    }

    /// Fail the next `count` cancellations with a transient error
    pub fn fail_next_cancels(&self, count: usize) {
        self.state().cancel_failures += count;
    }

    pub fn fail_next_book_fetch(&self) {
        self.state().book_failures += 1;
    }

    pub fn fail_next_fill_query(&self) {
        self.state().fill_query_failures += 1;
    }

    pub fn fail_next_position_query(&self) {
        self.state().position_failures += 1;
    }

    /// Every order ever accepted, oldest first
    pub fn placed(&self) -> Vec<PlacedOrder> {
        self.state().placed.clone()
    }

    /// Orders accepted and not yet cancelled
    pub fn resting(&self) -> Vec<PlacedOrder> {
        self.state().resting.clone()
    }

    pub fn cancelled(&self) -> Vec<OrderId> {
        self.state().cancelled.clone()
    }

    /// Ids passed to each fill query, in call order
    pub fn fill_queries(&self) -> Vec<Vec<OrderId>> {
        self.state().fill_queries.clone()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn scripted_failure(what: &str) -> ExchangeError {
    ExchangeError::Api {
        venue: VENUE,
        status: 503,
        body: format!("scripted {what} failure"),
    }
}

#[async_trait]
impl ExchangeClient for FakeExchange {
    fn name(&self) -> &'static str {
        VENUE
    }

    fn supports_order_entry(&self) -> bool {
        true
    }

    async fn find_markets(&self, query: &str) -> Result<Vec<Market>, ExchangeError> {
        let query = query.to_lowercase();
        Ok(self
            .state()
            .markets
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    async fn fetch_order_book(&self, _market: &Market) -> Result<Option<OrderBook>, ExchangeError> {
        let mut state = self.state();
        if state.book_failures > 0 {
            state.book_failures -= 1;
            return Err(scripted_failure("book"));
        }
        Ok(state.book.clone())
    }

    async fn fetch_position(&self, _market: &Market) -> Result<i64, ExchangeError> {
        let mut state = self.state();
        if state.position_failures > 0 {
            state.position_failures -= 1;
            return Err(scripted_failure("position"));
        }
        Ok(state.position)
    }

    async fn place_order(
        &self,
        _market: &Market,
        side: Side,
        price: Decimal,
        size: u64,
    ) -> Result<OrderId, ExchangeError> {
        let mut state = self.state();
        if state.placement_failures.front() == Some(&side) {
            state.placement_failures.pop_front();
            return Err(scripted_failure("placement"));
        }

        state.next_id += 1;
        let order = PlacedOrder {
            order_id: OrderId::new(format!("fake-{}", state.next_id)),
            side,
            price,
            size,
        };
        state.resting.push(order.clone());
        state.placed.push(order.clone());
        Ok(order.order_id)
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), ExchangeError> {
        let mut state = self.state();
        if state.cancel_failures > 0 {
            state.cancel_failures -= 1;
            return Err(scripted_failure("cancel"));
        }

        let Some(index) = state.resting.iter().position(|o| &o.order_id == order_id) else {
            return Err(ExchangeError::UnknownOrder(order_id.clone()));
        };
        state.resting.remove(index);
        state.cancelled.push(order_id.clone());
        Ok(())
    }

    async fn fetch_fills(&self, order_ids: &[OrderId]) -> Result<Vec<Fill>, ExchangeError> {
        let mut state = self.state();
        state.fill_queries.push(order_ids.to_vec());
        if state.fill_query_failures > 0 {
            state.fill_query_failures -= 1;
            return Err(scripted_failure("fill query"));
        }

        let mut fills = Vec::new();
        let mut unmatched = VecDeque::new();
        while let Some((side, size)) = state.scripted_fills.pop_front() {
            let target = order_ids
                .iter()
                .rev()
                .filter_map(|id| state.placed.iter().find(|o| &o.order_id == id))
                .find(|o| o.side == side)
                .cloned();
            match target {
                Some(order) => {
                    state.position += side.sign() * size as i64;
                    let filled = state.filled.entry(order.order_id.clone()).or_insert(0);
                    *filled += size;
                    if *filled >= order.size {
                        state.resting.retain(|o| o.order_id != order.order_id);
                    }
                    fills.push(Fill {
                        order_id: order.order_id,
                        side,
                        price: order.price,
                        size,
                        observed_at: Utc::now(),
                    });
                }
                None => unmatched.push_back((side, size)),
            }
        }
        state.scripted_fills = unmatched;
        Ok(fills)
    }
}
