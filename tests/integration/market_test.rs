//! Market selection tests

use pm_maker::error::ErrorKind;
use pm_maker::market::{select_market, MarketSelectionError};
use pm_maker::testkit::exchange::FakeExchange;
use pm_maker::testkit::fixtures::market;
use rust_decimal_macros::dec;

fn exchange() -> FakeExchange {
    FakeExchange::new().with_markets(vec![
        market("a", Some(dec!(0.40))),
        market("b", Some(dec!(0.65))),
    ])
}

#[tokio::test]
async fn test_select_market_by_index() {
    let exchange = exchange();

    let first = select_market(&exchange, "test market", 0).await.unwrap();
    assert_eq!(first.id, "a");

    let second = select_market(&exchange, "Test Market", 1).await.unwrap();
    assert_eq!(second.id, "b");
    assert_eq!(second.last_price, Some(dec!(0.65)));
}

#[tokio::test]
async fn test_select_market_no_results() {
    let err = select_market(&exchange(), "weather", 0).await.unwrap_err();

    assert!(matches!(err, MarketSelectionError::NoMarkets { ref query } if query == "weather"));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_select_market_index_out_of_range() {
    let err = select_market(&exchange(), "test", 5).await.unwrap_err();

    assert!(matches!(
        err,
        MarketSelectionError::IndexOutOfRange { index: 5, found: 2 }
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
