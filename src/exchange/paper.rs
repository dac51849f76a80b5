//! Dry-run exchange with simulated order entry
//!
//! Market data comes from the wrapped venue client. Orders rest locally and
//! fill when the live book trades through them: a buy fills once the best ask
//! is at or below its price, a sell once the best bid is at or above it. Each
//! fill query executes at most the size of the touching level, at the order's
//! limit price.

use super::{ExchangeClient, ExchangeError, Fill, OrderId, Side};
use crate::market::Market;
use crate::orderbook::OrderBook;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

const ORDER_ID_PREFIX: &str = "dry-run-";

#[derive(Debug, Clone)]
struct SimOrder {
    market: Market,
    side: Side,
    price: Decimal,
    size: u64,
    filled: u64,
}

impl SimOrder {
    fn remaining(&self) -> u64 {
        self.size - self.filled
    }

    /// Contracts executable against the book right now
    fn crossing_size(&self, book: &OrderBook) -> u64 {
        let touch = match self.side {
            Side::Buy => book.asks.first().filter(|l| l.price <= self.price),
            Side::Sell => book.bids.first().filter(|l| l.price >= self.price),
        };
        touch
            .and_then(|l| l.size.floor().to_u64())
            .map_or(0, |size| size.min(self.remaining()))
    }
}

#[derive(Debug, Default)]
struct DryRunState {
    orders: HashMap<OrderId, SimOrder>,
    /// Position per outcome id
    positions: HashMap<String, i64>,
}

/// Simulated order entry on top of a market data client
pub struct DryRunExchange<C> {
    inner: C,
    state: RwLock<DryRunState>,
}

impl<C: ExchangeClient> DryRunExchange<C> {
    /// Wrap a venue client
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            state: RwLock::new(DryRunState::default()),
        }
    }

    /// Number of simulated orders still resting
    pub async fn resting_orders(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl<C: ExchangeClient> ExchangeClient for DryRunExchange<C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn supports_order_entry(&self) -> bool {
        true
    }

    async fn find_markets(&self, query: &str) -> Result<Vec<Market>, ExchangeError> {
        self.inner.find_markets(query).await
    }

    async fn fetch_order_book(&self, market: &Market) -> Result<Option<OrderBook>, ExchangeError> {
        self.inner.fetch_order_book(market).await
    }

    async fn fetch_position(&self, market: &Market) -> Result<i64, ExchangeError> {
        let state = self.state.read().await;
        Ok(state.positions.get(&market.outcome_id).copied().unwrap_or(0))
    }

    async fn place_order(
        &self,
        market: &Market,
        side: Side,
        price: Decimal,
        size: u64,
    ) -> Result<OrderId, ExchangeError> {
        let order_id = OrderId::new(format!("{ORDER_ID_PREFIX}{}", Uuid::new_v4()));
        let order = SimOrder {
            market: market.clone(),
            side,
            price,
            size,
            filled: 0,
        };

        self.state.write().await.orders.insert(order_id.clone(), order);
        tracing::info!(%order_id, %side, %price, size, "[DRY RUN] Order placed");
        Ok(order_id)
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), ExchangeError> {
        match self.state.write().await.orders.remove(order_id) {
            Some(_) => {
                tracing::info!(%order_id, "[DRY RUN] Order cancelled");
                Ok(())
            }
            None => Err(ExchangeError::UnknownOrder(order_id.clone())),
        }
    }

    async fn fetch_fills(&self, order_ids: &[OrderId]) -> Result<Vec<Fill>, ExchangeError> {
        let candidates: Vec<(OrderId, SimOrder)> = {
            let state = self.state.read().await;
            order_ids
                .iter()
                .filter_map(|id| state.orders.get(id).map(|o| (id.clone(), o.clone())))
                .collect()
        };
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        // The lock is not held across the book fetches
        let mut books: HashMap<String, Option<OrderBook>> = HashMap::new();
        for (_, order) in &candidates {
            if !books.contains_key(&order.market.outcome_id) {
                let book = self.inner.fetch_order_book(&order.market).await?;
                books.insert(order.market.outcome_id.clone(), book);
            }
        }

        let mut state = self.state.write().await;
        let mut fills = Vec::new();
        for (order_id, snapshot) in candidates {
            let Some(Some(book)) = books.get(&snapshot.market.outcome_id) else {
                continue;
            };
            // Cancelled while the books were being fetched
            let Some(order) = state.orders.get_mut(&order_id) else {
                continue;
            };
            let size = order.crossing_size(book);
            if size == 0 {
                continue;
            }

            order.filled += size;
            let fill = Fill {
                order_id: order_id.clone(),
                side: order.side,
                price: order.price,
                size,
                observed_at: Utc::now(),
            };
            let outcome_id = order.market.outcome_id.clone();
            if order.remaining() == 0 {
                state.orders.remove(&order_id);
            }
            *state.positions.entry(outcome_id).or_insert(0) += fill.side.sign() * size as i64;

            tracing::info!(
                %order_id,
                side = %fill.side,
                price = %fill.price,
                size,
                "[DRY RUN] Simulated fill"
            );
            fills.push(fill);
        }
        Ok(fills)
    }
}
