//! Alpha Market Adapter
//!
//! Implementation of the MarketDataPort for the exchange's alpha token market.
//! Handles endpoint URLs, response envelopes and lenient field parsing.

mod client;
pub mod types;

pub use client::{AlphaClient, AlphaEndpoints};
