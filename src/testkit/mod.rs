//! Shared test utilities for unit and integration tests
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`exchange`]: `FakeExchange`, a scripted in-memory `ExchangeClient`.
//! - [`fixtures`]: canonical configs, markets and books.

pub mod exchange;
pub mod fixtures;
