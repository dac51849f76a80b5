//! Quoting module
//!
//! Fair price derivation and inventory-aware quote construction

mod engine;
mod oracle;
mod types;

pub use engine::{QuoteEngine, QuoteParams};
pub use oracle::PriceOracle;
pub use types::{Quote, MAX_PRICE, MIN_PRICE};
