//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, the pipeline only sees the
//! `MarketDataPort` trait; the HTTP adapter and the in-memory mock both
//! implement it.

pub mod market_data;
pub mod models;
pub mod mocks;

pub use market_data::{FetchError, MarketDataPort};
pub use models::{Candle, KlineInterval, Ticker};
pub use mocks::MockMarketData;
