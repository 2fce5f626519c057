//! Market Data Port
//!
//! The four reads the pipeline needs from the alpha market. Implemented over
//! HTTP by `adapters::alpha::AlphaClient` and in memory by `mocks`.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::metadata::TokenRecord;
use crate::domain::universe::TradingPair;
use super::models::{Candle, KlineInterval, Ticker};

/// Failure of a single market data request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Response from {url} carried no data")]
    MissingData { url: String },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Decode { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::MissingData { url }
            | FetchError::InvalidUrl { url, .. } => url,
        }
    }
}

#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Full alpha token list
    async fn token_list(&self) -> Result<Vec<TokenRecord>, FetchError>;

    /// Every pair in the exchange listing, in listing order
    async fn exchange_pairs(&self) -> Result<Vec<TradingPair>, FetchError>;

    /// 24h ticker for one pair
    async fn ticker(&self, pair: &str) -> Result<Ticker, FetchError>;

    /// Candles for one pair, oldest first
    async fn klines(
        &self,
        pair: &str,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<Candle>, FetchError>;
}
