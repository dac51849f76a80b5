//! Per-market order lifecycle
//!
//! One `OrderLifecycleManager` owns everything mutable about a quoted
//! market: position, open orders, gate state and statistics. A cycle runs
//! cancel, risk check, fair price, quote, place, sleep and fill detection in
//! that order. Every exchange call is isolated; a failure is logged and only
//! the step that raised it is skipped.

use super::orders::{FillStatus, OpenOrder, OpenOrders};
use super::scheduler::Scheduler;
use crate::config::Config;
use crate::error::ErrorKind;
use crate::exchange::{ExchangeClient, Fill, OrderId, Side};
use crate::market::Market;
use crate::quoting::{PriceOracle, Quote, QuoteEngine, QuoteParams};
use crate::risk::{GateState, GateTransition, InventoryTracker, RiskGate};
use crate::stats::{RoundTrip, RoundTripMatcher, Stats, StatsRecorder};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Failed fill queries a cancelled order survives before it is forgotten
const MAX_LATE_FILL_QUERIES: u32 = 2;

/// What the quoting half of a cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteOutcome {
    /// A quote was computed and submitted (either side may have failed)
    Quoted(Quote),
    /// The risk gate was halted; nothing placed
    Halted,
    /// No fair price; nothing placed
    PriceUnavailable,
}

/// Fill detection results for one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settlement {
    pub fills: Vec<Fill>,
    /// Status of every queried order after the fills were applied
    pub statuses: Vec<(OrderId, FillStatus)>,
    pub round_trips: Vec<RoundTrip>,
    pub transitions: Vec<GateTransition>,
    /// Whether the fill query itself failed
    pub query_failed: bool,
}

/// Summary of one update cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub cancelled: usize,
    pub cancel_failures: usize,
    /// Gate change caused by reconciling against the venue position
    pub reconciliation: Option<GateTransition>,
    pub outcome: QuoteOutcome,
    pub placed: Vec<OrderId>,
    pub placement_failures: usize,
    pub settlement: Settlement,
}

/// Cancelled order still waiting for its late fills
#[derive(Debug)]
struct LateOrder {
    order: OpenOrder,
    failed_queries: u32,
}

#[derive(Debug, Default)]
struct CancelSummary {
    cancelled: usize,
    failed: usize,
}

/// Quoting context for a single market
pub struct OrderLifecycleManager {
    exchange: Arc<dyn ExchangeClient>,
    scheduler: Arc<dyn Scheduler>,
    market: Market,
    update_interval: Duration,
    sync_on_start: bool,
    reconcile_each_cycle: bool,
    oracle: PriceOracle,
    engine: QuoteEngine,
    inventory: InventoryTracker,
    gate: RiskGate,
    matcher: RoundTripMatcher,
    stats: StatsRecorder,
    open_orders: OpenOrders,
    /// Cancelled orders whose late fills have not been collected yet
    cancelled: Vec<LateOrder>,
    cycles: u64,
}

impl OrderLifecycleManager {
    pub fn new(
        config: &Config,
        exchange: Arc<dyn ExchangeClient>,
        market: Market,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            exchange,
            scheduler,
            market,
            update_interval: config.runtime.update_interval(),
            sync_on_start: config.inventory.sync_on_start,
            reconcile_each_cycle: config.inventory.reconcile_each_cycle,
            oracle: PriceOracle::new(config.quoting.min_book_depth),
            engine: QuoteEngine::new(QuoteParams::from(config)),
            inventory: InventoryTracker::new(
                config.inventory.rebalance_threshold,
                config.inventory.max_inventory,
            ),
            gate: RiskGate::new(),
            matcher: RoundTripMatcher::new(),
            stats: StatsRecorder::new(),
            open_orders: OpenOrders::new(),
            cancelled: Vec::new(),
            cycles: 0,
        }
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn position(&self) -> i64 {
        self.inventory.position()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn stats(&self) -> &Stats {
        self.stats.stats()
    }

    pub fn open_orders(&self) -> &OpenOrders {
        &self.open_orders
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Publish initial state and optionally adopt the venue position
    pub async fn initialize(&mut self) -> Option<GateTransition> {
        let transition = if self.sync_on_start {
            self.reconcile_position().await
        } else {
            None
        };

        telemetry::set_gauge(GaugeMetric::Inventory, self.inventory.position() as f64);
        telemetry::set_gauge(GaugeMetric::OpenOrders, 0.0);
        telemetry::set_gate_state(self.gate.state());
        tracing::info!(
            market = %self.market.id,
            position = self.inventory.position(),
            interval_secs = self.update_interval.as_secs(),
            "Order lifecycle initialized"
        );
        transition
    }

    /// Run one complete cycle, including the inter-cycle sleep
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = self.open_cycle().await;
        self.scheduler.sleep(self.update_interval).await;
        report.settlement = self.settle().await;
        self.log_cycle(&report);
        report
    }

    /// Cycle until `shutdown` resolves, then cancel everything and return the final stats
    ///
    /// The signal is only observed at the top of a cycle and during the
    /// sleep, so a cycle is never abandoned halfway through a step.
    pub async fn run<F>(&mut self, shutdown: F) -> Stats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.initialize().await;

        loop {
            let stop = tokio::select! {
                biased;
                _ = &mut shutdown => true,
                _ = std::future::ready(()) => false,
            };
            if stop {
                break;
            }

            let mut report = self.open_cycle().await;

            let scheduler = Arc::clone(&self.scheduler);
            let interrupted = tokio::select! {
                _ = scheduler.sleep(self.update_interval) => false,
                _ = &mut shutdown => true,
            };
            if interrupted {
                break;
            }

            report.settlement = self.settle().await;
            self.log_cycle(&report);
        }

        tracing::info!(cycles = self.cycles, "Shutdown requested");
        self.shutdown().await
    }

    /// Cancel all open orders, collect their last fills and report the stats
    ///
    /// The position is left as is; nothing is unwound.
    pub async fn shutdown(&mut self) -> Stats {
        let summary = self.cancel_open_orders().await;
        if summary.failed > 0 {
            tracing::error!(
                remaining = self.open_orders.len(),
                "Some orders could not be cancelled during shutdown"
            );
        }

        let settlement = self.settle().await;
        if !settlement.fills.is_empty() {
            tracing::info!(fills = settlement.fills.len(), "Collected fills during shutdown");
        }

        let stats = self.stats.stats().clone();
        tracing::info!(
            trades = stats.trades_count,
            total_profit = %stats.total_profit,
            avg_profit = %stats.avg_profit_per_trade,
            position = self.inventory.position(),
            unmatched_buys = self.matcher.unmatched_buys(),
            unmatched_sells = self.matcher.unmatched_sells(),
            "Final statistics"
        );
        stats
    }

    /// Cancel, reconcile, check the gate, price, quote and place
    async fn open_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let cancel = self.cancel_open_orders().await;

        let reconciliation = if self.reconcile_each_cycle {
            self.reconcile_position().await
        } else {
            None
        };

        let mut report = CycleReport {
            cycle: self.cycles,
            cancelled: cancel.cancelled,
            cancel_failures: cancel.failed,
            reconciliation,
            outcome: QuoteOutcome::Halted,
            placed: Vec::new(),
            placement_failures: 0,
            settlement: Settlement::default(),
        };

        if self.gate.is_halted() {
            tracing::info!(
                position = self.inventory.position(),
                "Risk gate halted, not quoting this cycle"
            );
            return report;
        }

        let Some(fair_price) = self.fair_price().await else {
            tracing::info!(market = %self.market.id, "Fair price unavailable, skipping cycle");
            telemetry::incr(CounterMetric::SkippedCycles);
            report.outcome = QuoteOutcome::PriceUnavailable;
            return report;
        };

        let position = self.inventory.position();
        let quote = self.engine.compute_quotes(fair_price, position);
        telemetry::set_decimal_gauge(GaugeMetric::FairPrice, fair_price);
        telemetry::set_decimal_gauge(GaugeMetric::BidPrice, quote.bid_price);
        telemetry::set_decimal_gauge(GaugeMetric::AskPrice, quote.ask_price);
        tracing::info!(
            %fair_price,
            bid = %quote.bid_price,
            ask = %quote.ask_price,
            size = quote.size,
            inventory = position,
            skew = %self.engine.skew(position),
            "Quote computed"
        );

        for (side, price) in [(Side::Buy, quote.bid_price), (Side::Sell, quote.ask_price)] {
            match self.place(side, price, quote.size).await {
                Some(order_id) => report.placed.push(order_id),
                None => report.placement_failures += 1,
            }
        }
        telemetry::set_gauge(GaugeMetric::OpenOrders, self.open_orders.len() as f64);

        report.outcome = QuoteOutcome::Quoted(quote);
        report
    }

    async fn place(&mut self, side: Side, price: Decimal, size: u64) -> Option<OrderId> {
        match self.exchange.place_order(&self.market, side, price, size).await {
            Ok(order_id) => {
                tracing::debug!(%order_id, %side, %price, size, "Order placed");
                telemetry::incr(CounterMetric::OrdersPlaced);
                self.open_orders
                    .insert(OpenOrder::new(order_id.clone(), side, price, size));
                Some(order_id)
            }
            Err(e) => {
                tracing::warn!(
                    %side,
                    %price,
                    size,
                    error = %e,
                    kind = %e.kind(),
                    "Order placement failed, side absent this cycle"
                );
                telemetry::incr(CounterMetric::PlacementFailures);
                None
            }
        }
    }

    /// Best-effort cancel of every tracked order
    ///
    /// Orders the venue no longer knows are dropped; any other failure
    /// keeps the order tracked as possibly live.
    async fn cancel_open_orders(&mut self) -> CancelSummary {
        let mut summary = CancelSummary::default();

        for order_id in self.open_orders.ids() {
            match self.exchange.cancel_order(&order_id).await {
                Ok(()) => {
                    tracing::debug!(%order_id, "Order cancelled");
                    self.retire(&order_id);
                    summary.cancelled += 1;
                }
                Err(e) if e.kind() == ErrorKind::Unavailable => {
                    tracing::debug!(%order_id, error = %e, "Order already gone");
                    self.retire(&order_id);
                    summary.cancelled += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        %order_id,
                        error = %e,
                        "Cancel failed, order may still be live"
                    );
                    telemetry::incr(CounterMetric::CancelFailures);
                    summary.failed += 1;
                }
            }
        }

        telemetry::set_gauge(GaugeMetric::OpenOrders, self.open_orders.len() as f64);
        summary
    }

    fn retire(&mut self, order_id: &OrderId) {
        if let Some(order) = self.open_orders.remove(order_id) {
            self.cancelled.push(LateOrder {
                order,
                failed_queries: 0,
            });
        }
    }

    async fn fair_price(&self) -> Option<Decimal> {
        let book = match self.exchange.fetch_order_book(&self.market).await {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(error = %e, kind = %e.kind(), "Order book fetch failed");
                None
            }
        };
        self.oracle
            .compute_fair_price(book.as_ref(), self.market.last_price)
    }

    async fn reconcile_position(&mut self) -> Option<GateTransition> {
        let venue_position = match self.exchange.fetch_position(&self.market).await {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(error = %e, kind = %e.kind(), "Position query failed");
                return None;
            }
        };

        if let Some(previous) = self.inventory.reconcile(venue_position) {
            tracing::warn!(
                previous,
                position = venue_position,
                "Position drift detected, adopting venue position"
            );
            telemetry::set_gauge(GaugeMetric::Inventory, venue_position as f64);
        }

        let transition = self.gate.evaluate(&self.inventory);
        if let Some(t) = transition {
            telemetry::set_gate_state(t.to);
        }
        transition
    }

    /// Query fills for tracked and recently cancelled orders and apply them
    async fn settle(&mut self) -> Settlement {
        let mut settlement = Settlement::default();
        let mut order_ids = self.open_orders.ids();
        order_ids.extend(self.cancelled.iter().map(|late| late.order.external_id.clone()));
        if order_ids.is_empty() {
            return settlement;
        }

        let fills = match self.exchange.fetch_fills(&order_ids).await {
            Ok(fills) => fills,
            Err(e) => {
                tracing::warn!(
                    orders = order_ids.len(),
                    error = %e,
                    kind = %e.kind(),
                    "Fill query failed, retrying next cycle"
                );
                settlement.query_failed = true;
                self.expire_late_orders();
                return settlement;
            }
        };

        let mut late: Vec<OpenOrder> = std::mem::take(&mut self.cancelled)
            .into_iter()
            .map(|late| late.order)
            .collect();
        for fill in fills {
            if fill.size == 0 {
                continue;
            }
            if let Some(order) = self.open_orders.get_mut(&fill.order_id) {
                if order.record_fill(fill.size) == FillStatus::Full {
                    self.open_orders.remove(&fill.order_id);
                }
            } else if let Some(order) = late.iter_mut().find(|o| o.external_id == fill.order_id) {
                order.record_fill(fill.size);
                tracing::info!(order_id = %fill.order_id, "Late fill on cancelled order");
            } else {
                tracing::warn!(order_id = %fill.order_id, "Fill for untracked order");
            }
            self.apply_fill(&fill, &mut settlement);
            settlement.fills.push(fill);
        }

        for order_id in order_ids {
            let status = self
                .open_orders
                .get(&order_id)
                .or_else(|| late.iter().find(|o| o.external_id == order_id))
                .map_or(FillStatus::Full, OpenOrder::status);
            if status != FillStatus::None {
                tracing::debug!(%order_id, %status, "Order fill status");
            }
            settlement.statuses.push((order_id, status));
        }

        telemetry::set_gauge(GaugeMetric::OpenOrders, self.open_orders.len() as f64);
        settlement
    }

    /// Count a failed query against every cancelled order, dropping the exhausted ones
    fn expire_late_orders(&mut self) {
        let before = self.cancelled.len();
        self.cancelled.retain_mut(|late| {
            late.failed_queries += 1;
            late.failed_queries < MAX_LATE_FILL_QUERIES
        });

        let dropped = before - self.cancelled.len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                remaining = self.cancelled.len(),
                "Giving up on late fills for cancelled orders"
            );
        }
    }

    fn apply_fill(&mut self, fill: &Fill, settlement: &mut Settlement) {
        let position = self.inventory.apply(fill);
        telemetry::incr(CounterMetric::Fills);
        telemetry::set_gauge(GaugeMetric::Inventory, position as f64);
        tracing::info!(
            order_id = %fill.order_id,
            side = %fill.side,
            price = %fill.price,
            size = fill.size,
            inventory = position,
            "Fill applied"
        );

        if let Some(transition) = self.gate.evaluate(&self.inventory) {
            telemetry::set_gate_state(transition.to);
            settlement.transitions.push(transition);
        }

        for round_trip in self.matcher.push(fill) {
            self.stats.record(&round_trip);
            telemetry::incr(CounterMetric::RoundTrips);
            telemetry::set_decimal_gauge(GaugeMetric::RealizedProfit, self.stats.total_profit());
            tracing::info!(
                buy = %round_trip.buy_price,
                sell = %round_trip.sell_price,
                size = round_trip.size,
                profit = %round_trip.profit,
                total_profit = %self.stats.total_profit(),
                "Round trip completed"
            );
            settlement.round_trips.push(round_trip);
        }
    }

    fn log_cycle(&self, report: &CycleReport) {
        tracing::debug!(
            cycle = report.cycle,
            cancelled = report.cancelled,
            cancel_failures = report.cancel_failures,
            placed = report.placed.len(),
            placement_failures = report.placement_failures,
            fills = report.settlement.fills.len(),
            position = self.inventory.position(),
            state = %self.gate.state(),
            "Cycle complete"
        );
    }
}
