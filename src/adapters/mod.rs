//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - HTTP: GET + JSON decode with the shared User-Agent and timeout
//! - Alpha: the alpha market endpoints behind `MarketDataPort`
//! - CLI: Command-line interface handlers

pub mod alpha;
pub mod cli;
pub mod http;

pub use alpha::{AlphaClient, AlphaEndpoints};
pub use cli::CliApp;
pub use http::HttpFetcher;
