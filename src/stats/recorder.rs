//! Trade count and realized profit accounting

use super::RoundTrip;
use rust_decimal::Decimal;
use serde::Serialize;

/// Accumulated trading statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Completed round trips
    pub trades_count: u64,
    /// Sum of realized round-trip profit
    pub total_profit: Decimal,
    /// `total_profit / trades_count`, zero before the first trade
    pub avg_profit_per_trade: Decimal,
    /// Contracts matched across all round trips
    pub matched_volume: u64,
}

impl Stats {
    /// Format as table for CLI output
    pub fn format_table(&self, position: i64) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               FINAL STATISTICS
══════════════════════════════════════════════════════
Total Trades:     {}
Matched Volume:   {} contracts
Total Profit:     ${:.2}
Avg Profit/Trade: ${:.3}
Final Inventory:  {:+} contracts
══════════════════════════════════════════════════════
"#,
            self.trades_count,
            self.matched_volume,
            self.total_profit,
            self.avg_profit_per_trade,
            position,
        )
    }
}

/// Accumulates completed round trips into `Stats`
#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    stats: Stats,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, round_trip: &RoundTrip) {
        let stats = &mut self.stats;
        stats.trades_count += 1;
        stats.total_profit += round_trip.profit;
        stats.matched_volume += round_trip.size;
        stats.avg_profit_per_trade = stats.total_profit / Decimal::from(stats.trades_count);
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn trades_count(&self) -> u64 {
        self.stats.trades_count
    }

    pub fn total_profit(&self) -> Decimal {
        self.stats.total_profit
    }

    pub fn avg_profit_per_trade(&self) -> Decimal {
        self.stats.avg_profit_per_trade
    }
}
