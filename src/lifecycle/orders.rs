//! Orders the manager believes may be resting on the venue

use crate::exchange::{OrderId, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// How much of an order has executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStatus {
    None,
    Partial,
    Full,
}

impl std::fmt::Display for FillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillStatus::None => write!(f, "none"),
            FillStatus::Partial => write!(f, "partial"),
            FillStatus::Full => write!(f, "full"),
        }
    }
}

/// A placed order tracked until it is cancelled or fully filled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenOrder {
    pub external_id: OrderId,
    pub side: Side,
    pub price: Decimal,
    pub size: u64,
    pub filled: u64,
    pub placed_at: DateTime<Utc>,
}

impl OpenOrder {
    pub fn new(external_id: OrderId, side: Side, price: Decimal, size: u64) -> Self {
        Self {
            external_id,
            side,
            price,
            size,
            filled: 0,
            placed_at: Utc::now(),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.filled)
    }

    pub fn status(&self) -> FillStatus {
        match self.filled {
            0 => FillStatus::None,
            f if f < self.size => FillStatus::Partial,
            _ => FillStatus::Full,
        }
    }

    /// Record an execution and return the resulting status
    pub fn record_fill(&mut self, size: u64) -> FillStatus {
        self.filled = self.filled.saturating_add(size).min(self.size);
        self.status()
    }
}

/// Tracked orders in placement order
#[derive(Debug, Clone, Default)]
pub struct OpenOrders {
    orders: Vec<OpenOrder>,
}

impl OpenOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: OpenOrder) {
        self.orders.push(order);
    }

    pub fn get(&self, id: &OrderId) -> Option<&OpenOrder> {
        self.orders.iter().find(|o| &o.external_id == id)
    }

    pub fn get_mut(&mut self, id: &OrderId) -> Option<&mut OpenOrder> {
        self.orders.iter_mut().find(|o| &o.external_id == id)
    }

    pub fn remove(&mut self, id: &OrderId) -> Option<OpenOrder> {
        let index = self.orders.iter().position(|o| &o.external_id == id)?;
        Some(self.orders.remove(index))
    }

    pub fn ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|o| o.external_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
