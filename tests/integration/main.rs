//! Integration tests for pm-maker

mod config_test;
mod dry_run_test;
mod lifecycle_test;
mod market_test;
