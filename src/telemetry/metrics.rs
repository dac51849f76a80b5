//! Prometheus metrics

use crate::risk::GateState;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Orders accepted by the venue
    OrdersPlaced,
    /// Order placements rejected or failed
    PlacementFailures,
    /// Cancellations that failed
    CancelFailures,
    /// Fills applied to inventory
    Fills,
    /// Completed round trips
    RoundTrips,
    /// Cycles skipped because no fair price was available
    SkippedCycles,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Signed inventory in contracts
    Inventory,
    /// Realized profit
    RealizedProfit,
    /// Last fair price
    FairPrice,
    /// Last quoted bid
    BidPrice,
    /// Last quoted ask
    AskPrice,
    /// 1 while halted, 0 while active
    RiskHalted,
    /// Orders currently tracked as open
    OpenOrders,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::OrdersPlaced => "pm_maker_orders_placed_total",
            CounterMetric::PlacementFailures => "pm_maker_placement_failures_total",
            CounterMetric::CancelFailures => "pm_maker_cancel_failures_total",
            CounterMetric::Fills => "pm_maker_fills_total",
            CounterMetric::RoundTrips => "pm_maker_round_trips_total",
            CounterMetric::SkippedCycles => "pm_maker_skipped_cycles_total",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::Inventory => "pm_maker_inventory_contracts",
            GaugeMetric::RealizedProfit => "pm_maker_realized_profit_usd",
            GaugeMetric::FairPrice => "pm_maker_fair_price",
            GaugeMetric::BidPrice => "pm_maker_bid_price",
            GaugeMetric::AskPrice => "pm_maker_ask_price",
            GaugeMetric::RiskHalted => "pm_maker_risk_halted",
            GaugeMetric::OpenOrders => "pm_maker_open_orders",
        }
    }
}

/// Increment a counter
pub fn incr(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Set a gauge from a decimal value
pub fn set_decimal_gauge(metric: GaugeMetric, value: Decimal) {
    set_gauge(metric, value.to_f64().unwrap_or_default());
}

/// Publish the risk gate state
pub fn set_gate_state(state: GateState) {
    let value = match state {
        GateState::Active => 0.0,
        GateState::Halted => 1.0,
    };
    set_gauge(GaugeMetric::RiskHalted, value);
}
