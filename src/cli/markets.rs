//! Markets command implementation

use crate::config::Config;
use crate::exchange::build_market_data;
use crate::market::Market;
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct MarketsArgs {
    /// Search query (defaults to the configured one)
    pub query: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl MarketsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = build_market_data(config.platform)?;
        let query = self.query.as_deref().unwrap_or(&config.market.query);
        let markets = client.find_markets(query).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&markets)?);
            return Ok(());
        }

        if markets.is_empty() {
            println!("No markets found for \"{query}\" on {}", config.platform);
            return Ok(());
        }
        print!("{}", format_markets(&markets));
        Ok(())
    }
}

fn format_markets(markets: &[Market]) -> String {
    let price = |p: Option<Decimal>| p.map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
    let amount = |v: Option<Decimal>| v.map_or_else(|| "-".to_string(), |v| format!("{:.0}", v));

    let mut out = format!(
        "{:>3}  {:>6}  {:>12}  {:>12}  {}\n",
        "#", "PRICE", "VOLUME", "LIQUIDITY", "TITLE"
    );
    for (i, m) in markets.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:>6}  {:>12}  {:>12}  {}\n",
            i,
            price(m.last_price),
            amount(m.volume),
            amount(m.liquidity),
            m.title
        ));
    }
    out
}
