//! Quote command implementation

use crate::config::Config;
use crate::quoting::{QuoteEngine, QuoteParams};
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Fair price of the primary outcome
    #[arg(long)]
    pub fair: Decimal,

    /// Signed inventory in contracts
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub inventory: i64,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl QuoteArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if self.fair <= Decimal::ZERO || self.fair >= Decimal::ONE {
            anyhow::bail!("fair price must be inside (0, 1), got {}", self.fair);
        }

        let engine = QuoteEngine::new(QuoteParams::from(config));
        let quote = engine.compute_quotes(self.fair, self.inventory);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&quote)?);
            return Ok(());
        }

        println!("Fair:      {}", self.fair);
        println!("Inventory: {:+}", self.inventory);
        println!("Skew:      {}", engine.skew(self.inventory));
        println!("Bid:       {} x {}", quote.bid_price, quote.size);
        println!("Ask:       {} x {}", quote.ask_price, quote.size);
        println!("Spread:    {}", quote.spread());
        Ok(())
    }
}
