//! Order lifecycle module
//!
//! Drives the per-market update cycle against an `ExchangeClient`.

mod manager;
mod orders;
mod scheduler;

pub use manager::{CycleReport, OrderLifecycleManager, QuoteOutcome, Settlement};
pub use orders::{FillStatus, OpenOrder, OpenOrders};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
