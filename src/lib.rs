//! pm-maker: Inventory-aware market making bot for binary prediction markets
//!
//! This library provides the core components for:
//! - Market discovery and order book retrieval on Polymarket, Kalshi and Limitless
//! - Fair price derivation with fallback to the venue's last price
//! - Inventory-skewed, bounded quote computation
//! - A hysteresis risk gate on inventory
//! - The per-market cancel/quote/place/fill order lifecycle
//! - FIFO round-trip matching and realized profit statistics
//! - Dry-run order simulation against live books
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod lifecycle;
pub mod market;
pub mod orderbook;
pub mod quoting;
pub mod risk;
pub mod stats;
pub mod telemetry;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
