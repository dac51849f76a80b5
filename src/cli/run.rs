//! Run command implementation

use crate::config::Config;
use crate::exchange::build_exchange;
use crate::lifecycle::{OrderLifecycleManager, TokioScheduler};
use crate::market::select_market;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured market query
    #[arg(long)]
    pub query: Option<String>,

    /// Override the configured market index
    #[arg(long)]
    pub index: Option<usize>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let exchange = build_exchange(config)?;

        let query = self.query.as_deref().unwrap_or(&config.market.query);
        let index = self.index.unwrap_or(config.market.index);
        let market = select_market(exchange.as_ref(), query, index).await?;

        println!("Quoting: {}", market.title);
        println!("  Venue:  {}", config.platform);
        println!("  Market: {}", market.id);
        if config.runtime.dry_run {
            println!("  Mode:   DRY RUN");
        }

        let mut manager =
            OrderLifecycleManager::new(config, exchange, market, Arc::new(TokioScheduler));
        let stats = manager.run(shutdown_signal()).await;

        println!("{}", stats.format_table(manager.position()));
        Ok(())
    }
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Interrupt received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
