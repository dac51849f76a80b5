//! Dry-run simulation driven through the lifecycle manager

use pm_maker::exchange::{DryRunExchange, ExchangeClient, Side};
use pm_maker::lifecycle::{FillStatus, ManualScheduler, OrderLifecycleManager};
use pm_maker::orderbook::{OrderBook, PriceLevel};
use pm_maker::testkit::exchange::FakeExchange;
use pm_maker::testkit::fixtures::{market, test_config};
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Asks only, so the fair price comes from the last trade at 0.52
fn crossing_book() -> OrderBook {
    OrderBook::from_levels("m1-yes", vec![], vec![PriceLevel::new(dec!(0.45), dec!(6))])
        .with_last_price(Some(dec!(0.52)))
}

#[tokio::test]
async fn test_dry_run_simulates_orders_and_fills() {
    let venue = FakeExchange::new().with_book(crossing_book());
    let dry_run = Arc::new(DryRunExchange::new(venue));
    let mut manager = OrderLifecycleManager::new(
        &test_config(),
        dry_run.clone(),
        market("m1", None),
        Arc::new(ManualScheduler::new()),
    );

    let report = manager.run_cycle().await;

    // Bid at 0.50 trades through the 0.45 ask, limited to the 6 resting there
    let fills = &report.settlement.fills;
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].side, Side::Buy);
    assert_eq!(fills[0].price, dec!(0.50));
    assert_eq!(fills[0].size, 6);
    assert_eq!(
        report.settlement.statuses,
        vec![
            (report.placed[0].clone(), FillStatus::Partial),
            (report.placed[1].clone(), FillStatus::None),
        ]
    );

    assert_eq!(manager.position(), 6);
    assert_eq!(dry_run.fetch_position(manager.market()).await.unwrap(), 6);
    assert!(report.placed[0].as_str().starts_with("dry-run-"));

    let stats = manager.shutdown().await;
    assert_eq!(stats.trades_count, 0);
    assert_eq!(dry_run.resting_orders().await, 0);
}
