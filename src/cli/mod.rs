//! CLI interface for pm-maker
//!
//! Provides subcommands for:
//! - `run`: Quote the configured market until Ctrl-C
//! - `markets`: Search and list markets on the configured venue
//! - `quote`: Compute a quote offline with the configured parameters
//! - `config`: Show the validated configuration

mod markets;
mod quote;
mod run;

pub use markets::MarketsArgs;
pub use quote::QuoteArgs;
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pm-maker")]
#[command(about = "Inventory-aware market making bot for binary prediction markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quote the configured market until interrupted
    Run(RunArgs),
    /// Search markets on the configured venue
    Markets(MarketsArgs),
    /// Compute a quote for a fair price and inventory
    Quote(QuoteArgs),
    /// Show the validated configuration
    Config,
}
