//! Fair price derivation

use crate::orderbook::OrderBook;
use rust_decimal::Decimal;

/// Derives the price quotes are centered on
#[derive(Debug, Clone, Default)]
pub struct PriceOracle {
    /// Touch levels smaller than this make the book count as empty
    min_book_depth: Decimal,
}

impl PriceOracle {
    pub fn new(min_book_depth: Decimal) -> Self {
        Self { min_book_depth }
    }

    /// Mid of the best bid and ask, else the venue's last price
    ///
    /// `fallback` is the platform-reported outcome price captured at market
    /// selection. Returns `None` when no usable price exists; the caller
    /// skips the cycle.
    pub fn compute_fair_price(
        &self,
        book: Option<&OrderBook>,
        fallback: Option<Decimal>,
    ) -> Option<Decimal> {
        let from_book = book.and_then(|b| self.book_mid(b));
        let last = book.and_then(|b| b.last_price).or(fallback);

        from_book
            .or(last)
            .filter(|p| *p > Decimal::ZERO && *p < Decimal::ONE)
    }

    fn book_mid(&self, book: &OrderBook) -> Option<Decimal> {
        let bid_size = book.best_bid_size()?;
        let ask_size = book.best_ask_size()?;
        if bid_size < self.min_book_depth || ask_size < self.min_book_depth {
            tracing::debug!(
                %bid_size,
                %ask_size,
                min_depth = %self.min_book_depth,
                "Book too thin at the touch"
            );
            return None;
        }
        book.mid_price()
    }
}
