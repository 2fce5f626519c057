//! alpha-watch - Alpha Market Volatility Snapshots
//!
//! Pulls the alpha token list and exchange listing, measures the intraday
//! range of every trading pair and writes a ranked JSON snapshot.
//!
//! # Modules
//!
//! - `domain`: Core logic (metadata index, universe, metrics, ranking, snapshot)
//! - `ports`: Trait abstractions (MarketDataPort) and test mocks
//! - `adapters`: External implementations (HTTP, alpha API, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Snapshot pipeline and interval watcher

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
