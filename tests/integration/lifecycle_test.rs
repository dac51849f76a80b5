//! Order lifecycle tests driven by the scripted exchange
//!
//! Test config: target spread 0.04, order size 10, factor 0.001,
//! max inventory 20, rebalance threshold 10, linear skew.

use pm_maker::config::Config;
use pm_maker::exchange::Side;
use pm_maker::lifecycle::{FillStatus, ManualScheduler, OrderLifecycleManager, QuoteOutcome};
use pm_maker::orderbook::{OrderBook, PriceLevel};
use pm_maker::quoting::Quote;
use pm_maker::risk::{GateState, GateTransition};
use pm_maker::stats::RoundTrip;
use pm_maker::testkit::exchange::FakeExchange;
use pm_maker::testkit::fixtures::{book, market, test_config};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    exchange: Arc<FakeExchange>,
    scheduler: Arc<ManualScheduler>,
    manager: OrderLifecycleManager,
}

fn harness_with(config: &Config, exchange: FakeExchange, last_price: Option<Decimal>) -> Harness {
    let exchange = Arc::new(exchange);
    let scheduler = Arc::new(ManualScheduler::new());
    let manager = OrderLifecycleManager::new(
        config,
        exchange.clone(),
        market("m1", last_price),
        scheduler.clone(),
    );
    Harness {
        exchange,
        scheduler,
        manager,
    }
}

fn harness(exchange: FakeExchange) -> Harness {
    harness_with(&test_config(), exchange, None)
}

/// Mid 0.52
fn quoting_book() -> OrderBook {
    book("m1-yes", dec!(0.50), dec!(0.54), dec!(100))
}

fn quote(bid: Decimal, ask: Decimal) -> QuoteOutcome {
    QuoteOutcome::Quoted(Quote {
        bid_price: bid,
        ask_price: ask,
        size: 10,
    })
}

#[tokio::test]
async fn test_cycle_quotes_around_book_mid() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));

    let report = h.manager.run_cycle().await;

    assert_eq!(report.cycle, 1);
    assert_eq!(report.outcome, quote(dec!(0.50), dec!(0.54)));
    assert_eq!(report.placed.len(), 2);

    let resting = h.exchange.resting();
    assert_eq!(resting.len(), 2);
    assert_eq!((resting[0].side, resting[0].price, resting[0].size), (Side::Buy, dec!(0.50), 10));
    assert_eq!((resting[1].side, resting[1].price, resting[1].size), (Side::Sell, dec!(0.54), 10));

    assert_eq!(h.scheduler.sleeps(), vec![Duration::from_secs(5)]);
    assert_eq!(h.exchange.fill_queries(), vec![report.placed.clone()]);
    assert!(report
        .settlement
        .statuses
        .iter()
        .all(|(_, status)| *status == FillStatus::None));
}

#[tokio::test]
async fn test_next_cycle_cancels_and_collects_late_fills() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));

    let first = h.manager.run_cycle().await;
    h.exchange.script_fill(Side::Buy, 3);
    let second = h.manager.run_cycle().await;

    assert_eq!(second.cancelled, 2);
    assert_eq!(h.exchange.cancelled(), first.placed);

    // The cancelled bid executed before the cancel landed
    let late_bid = first.placed[0].clone();
    assert!(second
        .settlement
        .statuses
        .contains(&(late_bid.clone(), FillStatus::Partial)));
    assert_eq!(h.manager.position(), 3);

    // Cancelled orders are only queried once
    let third = h.manager.run_cycle().await;
    let queries = h.exchange.fill_queries();
    assert!(!queries[2].contains(&late_bid));
    assert_eq!(queries[2].len(), 4);
    assert_eq!(third.outcome, quote(dec!(0.497), dec!(0.537)));
}

#[tokio::test]
async fn test_round_trip_records_profit() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));
    h.exchange.script_fill(Side::Buy, 10);
    h.exchange.script_fill(Side::Sell, 10);

    let report = h.manager.run_cycle().await;

    assert_eq!(report.settlement.fills.len(), 2);
    assert_eq!(
        report.settlement.round_trips,
        vec![RoundTrip {
            buy_price: dec!(0.50),
            sell_price: dec!(0.54),
            size: 10,
            profit: dec!(0.40),
        }]
    );
    assert!(report
        .settlement
        .statuses
        .iter()
        .all(|(_, status)| *status == FillStatus::Full));

    let stats = h.manager.stats();
    assert_eq!(stats.trades_count, 1);
    assert_eq!(stats.total_profit, dec!(0.40));
    assert_eq!(stats.avg_profit_per_trade, dec!(0.40));
    assert_eq!(h.manager.position(), 0);
    assert!(h.manager.open_orders().is_empty());

    // Fully filled orders are not cancelled again
    let next = h.manager.run_cycle().await;
    assert_eq!(next.cancelled, 0);
}

#[tokio::test]
async fn test_partial_fill_keeps_order_tracked() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));
    h.exchange.script_fill(Side::Buy, 4);

    let report = h.manager.run_cycle().await;
    let (bid, ask) = (report.placed[0].clone(), report.placed[1].clone());

    assert_eq!(
        report.settlement.statuses,
        vec![(bid.clone(), FillStatus::Partial), (ask, FillStatus::None)]
    );
    assert_eq!(h.manager.open_orders().len(), 2);
    assert_eq!(h.manager.open_orders().get(&bid).unwrap().filled, 4);
    assert_eq!(h.manager.position(), 4);

    // Long 4 skews the next quote down by 0.004
    let next = h.manager.run_cycle().await;
    assert_eq!(next.cancelled, 2);
    assert_eq!(next.outcome, quote(dec!(0.496), dec!(0.536)));
}

#[tokio::test]
async fn test_risk_gate_halts_and_resumes() {
    let mut config = test_config();
    config.inventory.reconcile_each_cycle = true;
    let mut h = harness_with(&config, FakeExchange::new().with_book(quoting_book()), None);

    h.exchange.script_fill(Side::Buy, 10);
    h.manager.run_cycle().await;
    assert_eq!(h.manager.position(), 10);
    assert_eq!(h.manager.gate_state(), GateState::Active);

    // Reaching max inventory halts quoting
    h.exchange.script_fill(Side::Buy, 10);
    let second = h.manager.run_cycle().await;
    assert_eq!(second.outcome, quote(dec!(0.49), dec!(0.53)));
    assert_eq!(
        second.settlement.transitions,
        vec![GateTransition {
            from: GateState::Active,
            to: GateState::Halted,
            position: 20,
        }]
    );
    assert_eq!(h.manager.gate_state(), GateState::Halted);

    // Halted: cancels are still attempted, nothing is placed, fills still count
    h.exchange.fail_next_cancels(1);
    h.exchange.script_fill(Side::Sell, 10);
    let third = h.manager.run_cycle().await;
    assert_eq!(third.outcome, QuoteOutcome::Halted);
    assert_eq!(third.cancel_failures, 1);
    assert!(third.placed.is_empty());
    assert_eq!(h.exchange.placed().len(), 4);
    assert_eq!(h.manager.position(), 10);
    // Back under max but not under the rebalance threshold
    assert_eq!(h.manager.gate_state(), GateState::Halted);

    // Falling below the rebalance threshold resumes quoting
    h.exchange.set_position(5);
    let fourth = h.manager.run_cycle().await;
    assert_eq!(
        fourth.reconciliation,
        Some(GateTransition {
            from: GateState::Halted,
            to: GateState::Active,
            position: 5,
        })
    );
    assert_eq!(fourth.outcome, quote(dec!(0.495), dec!(0.535)));
    assert_eq!(fourth.placed.len(), 2);
}

#[tokio::test]
async fn test_placement_failure_leaves_other_side() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));
    h.exchange.fail_next_placement(Side::Buy);

    let report = h.manager.run_cycle().await;

    assert_eq!(report.placed.len(), 1);
    assert_eq!(report.placement_failures, 1);
    let resting = h.exchange.resting();
    assert_eq!(resting.len(), 1);
    assert_eq!(resting[0].side, Side::Sell);
    assert_eq!(h.manager.open_orders().len(), 1);
}

#[tokio::test]
async fn test_cancel_failure_keeps_order_tracked() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));

    let first = h.manager.run_cycle().await;
    h.exchange.fail_next_cancels(1);
    let second = h.manager.run_cycle().await;

    assert_eq!(second.cancel_failures, 1);
    assert_eq!(second.cancelled, 1);
    assert_eq!(h.manager.open_orders().len(), 3);

    // The possibly-live bid is still queried for fills
    let queries = h.exchange.fill_queries();
    assert_eq!(queries[1].len(), 4);
    assert!(queries[1].contains(&first.placed[0]));

    let third = h.manager.run_cycle().await;
    assert_eq!(third.cancelled, 3);
    assert_eq!(h.exchange.resting().len(), 2);
}

#[tokio::test]
async fn test_price_unavailable_skips_quoting() {
    let mut h = harness(FakeExchange::new());

    let report = h.manager.run_cycle().await;

    assert_eq!(report.outcome, QuoteOutcome::PriceUnavailable);
    assert!(report.placed.is_empty());
    assert!(h.exchange.placed().is_empty());
    assert!(h.exchange.fill_queries().is_empty());
    assert_eq!(h.scheduler.sleep_count(), 1);
}

#[tokio::test]
async fn test_book_failure_falls_back_to_market_price() {
    let exchange = FakeExchange::new().with_book(quoting_book());
    exchange.fail_next_book_fetch();
    let mut h = harness_with(&test_config(), exchange, Some(dec!(0.60)));

    let report = h.manager.run_cycle().await;

    assert_eq!(report.outcome, quote(dec!(0.58), dec!(0.62)));
}

#[tokio::test]
async fn test_one_sided_book_uses_last_trade() {
    let one_sided = OrderBook::from_levels(
        "m1-yes",
        vec![PriceLevel::new(dec!(0.25), dec!(40))],
        vec![],
    )
    .with_last_price(Some(dec!(0.30)));
    let mut h = harness(FakeExchange::new().with_book(one_sided));

    let report = h.manager.run_cycle().await;

    assert_eq!(report.outcome, quote(dec!(0.28), dec!(0.32)));
}

#[tokio::test]
async fn test_fill_query_failure_is_retried() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));
    h.exchange.fail_next_fill_query();
    h.exchange.script_fill(Side::Buy, 5);

    let first = h.manager.run_cycle().await;
    assert!(first.settlement.query_failed);
    assert!(first.settlement.fills.is_empty());
    assert_eq!(h.manager.position(), 0);
    assert_eq!(h.manager.open_orders().len(), 2);

    let second = h.manager.run_cycle().await;
    assert!(!second.settlement.query_failed);
    assert_eq!(second.settlement.fills.len(), 1);
    assert_eq!(h.manager.position(), 5);
}

#[tokio::test]
async fn test_shutdown_cancels_and_collects_fills() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));

    let report = h.manager.run_cycle().await;
    h.exchange.script_fill(Side::Sell, 10);
    let stats = h.manager.shutdown().await;

    assert!(h.exchange.resting().is_empty());
    assert_eq!(h.exchange.cancelled(), report.placed);
    assert!(h.manager.open_orders().is_empty());
    assert_eq!(h.manager.position(), -10);
    assert_eq!(stats.trades_count, 0);
}

#[tokio::test]
async fn test_shutdown_with_failed_cancel() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));

    h.manager.run_cycle().await;
    h.exchange.fail_next_cancels(1);
    h.manager.shutdown().await;

    assert_eq!(h.manager.open_orders().len(), 1);
    assert_eq!(h.exchange.resting().len(), 1);
}

#[tokio::test]
async fn test_run_stops_on_shutdown_signal() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));
    let scheduler = h.scheduler.clone();
    let shutdown = async move {
        while scheduler.sleep_count() < 3 {
            tokio::task::yield_now().await;
        }
    };

    h.manager.run(shutdown).await;

    assert_eq!(h.manager.cycles(), 3);
    assert_eq!(h.scheduler.sleep_count(), 3);
    assert!(h.exchange.resting().is_empty());
    assert!(h.manager.open_orders().is_empty());
}

#[tokio::test]
async fn test_run_with_immediate_shutdown_places_nothing() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));

    let stats = h.manager.run(async {}).await;

    assert_eq!(h.manager.cycles(), 0);
    assert!(h.exchange.placed().is_empty());
    assert_eq!(stats.trades_count, 0);
}

#[tokio::test]
async fn test_sync_on_start_adopts_venue_position() {
    let mut config = test_config();
    config.inventory.sync_on_start = true;
    let mut h = harness_with(
        &config,
        FakeExchange::new().with_book(quoting_book()).with_position(25),
        None,
    );

    let transition = h.manager.initialize().await;

    assert_eq!(h.manager.position(), 25);
    assert_eq!(transition.map(|t| t.to), Some(GateState::Halted));
    let report = h.manager.run_cycle().await;
    assert_eq!(report.outcome, QuoteOutcome::Halted);
}

#[tokio::test]
async fn test_failing_fill_queries_stop_tracking_old_cancellations() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));

    for _ in 0..10 {
        h.exchange.fail_next_fill_query();
        let report = h.manager.run_cycle().await;
        assert!(report.settlement.query_failed);
    }

    // Two live orders plus the cancellations of the last two cycles
    let sizes: Vec<usize> = h.exchange.fill_queries().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![2, 4, 6, 6, 6, 6, 6, 6, 6, 6]);

    h.exchange.script_fill(Side::Buy, 5);
    let report = h.manager.run_cycle().await;
    assert!(!report.settlement.query_failed);
    assert_eq!(report.settlement.fills.len(), 1);
    assert_eq!(h.exchange.fill_queries().last().map(Vec::len), Some(6));
    assert_eq!(h.manager.position(), 5);
}

#[tokio::test]
async fn test_position_query_failure_keeps_quoting() {
    let mut config = test_config();
    config.inventory.reconcile_each_cycle = true;
    let mut h = harness_with(
        &config,
        FakeExchange::new().with_book(quoting_book()).with_position(25),
        None,
    );
    h.exchange.fail_next_position_query();

    let report = h.manager.run_cycle().await;

    assert_eq!(h.manager.position(), 0);
    assert_eq!(report.reconciliation, None);
    assert_eq!(h.manager.gate_state(), GateState::Active);
    assert_eq!(report.outcome, quote(dec!(0.50), dec!(0.54)));
    assert_eq!(report.placed.len(), 2);
    assert_eq!(h.exchange.resting().len(), 2);

    // The next query succeeds and the drift is adopted
    let report = h.manager.run_cycle().await;
    assert_eq!(h.manager.position(), 25);
    assert_eq!(report.reconciliation.map(|t| t.to), Some(GateState::Halted));
    assert_eq!(report.outcome, QuoteOutcome::Halted);
}

#[tokio::test]
async fn test_quotes_follow_book_between_cycles() {
    let mut h = harness(FakeExchange::new().with_book(quoting_book()));

    let first = h.manager.run_cycle().await;
    assert_eq!(first.outcome, quote(dec!(0.50), dec!(0.54)));

    h.exchange.set_book(Some(book("m1-yes", dec!(0.60), dec!(0.64), dec!(100))));
    let second = h.manager.run_cycle().await;
    assert_eq!(second.cancelled, 2);
    assert_eq!(second.outcome, quote(dec!(0.60), dec!(0.64)));

    h.exchange.set_book(None);
    let third = h.manager.run_cycle().await;
    assert_eq!(third.cancelled, 2);
    assert_eq!(third.outcome, QuoteOutcome::PriceUnavailable);
    assert!(h.exchange.resting().is_empty());
}
