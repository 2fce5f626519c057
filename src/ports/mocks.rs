use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use crate::domain::metadata::TokenRecord;
use crate::domain::universe::TradingPair;
use super::market_data::{FetchError, MarketDataPort};
use super::models::{Candle, KlineInterval, Ticker};

/// Mock market data port that records calls and allows controlled responses.
///
/// Anything not configured answers with HTTP 404.
#[derive(Debug, Default, Clone)]
pub struct MockMarketData {
    calls: Arc<Mutex<Vec<String>>>,
    tokens: Option<Vec<TokenRecord>>,
    pairs: Option<Vec<TradingPair>>,
    tickers: HashMap<String, Ticker>,
    klines: HashMap<(String, KlineInterval), Vec<Candle>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the token list
    pub fn with_tokens(mut self, tokens: Vec<TokenRecord>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Builder method to set the exchange listing
    pub fn with_pairs(mut self, pairs: Vec<TradingPair>) -> Self {
        self.pairs = Some(pairs);
        self
    }

    /// Builder method to set a ticker for a pair
    pub fn with_ticker(mut self, pair: &str, ticker: Ticker) -> Self {
        self.tickers.insert(pair.to_string(), ticker);
        self
    }

    /// Builder method to set candles for a pair and interval
    pub fn with_klines(mut self, pair: &str, interval: KlineInterval, candles: Vec<Candle>) -> Self {
        self.klines.insert((pair.to_string(), interval), candles);
        self
    }

    /// Get all recorded calls, e.g. `ticker:FOOUSDT`
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn not_found(call: &str) -> FetchError {
        FetchError::Status { url: format!("mock://{}", call), status: 404 }
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn token_list(&self) -> Result<Vec<TokenRecord>, FetchError> {
        self.record("token_list".to_string());
        self.tokens.clone().ok_or_else(|| Self::not_found("token_list"))
    }

    async fn exchange_pairs(&self) -> Result<Vec<TradingPair>, FetchError> {
        self.record("exchange_info".to_string());
        self.pairs.clone().ok_or_else(|| Self::not_found("exchange_info"))
    }

    async fn ticker(&self, pair: &str) -> Result<Ticker, FetchError> {
        let call = format!("ticker:{}", pair);
        self.record(call.clone());
        self.tickers.get(pair).copied().ok_or_else(|| Self::not_found(&call))
    }

    async fn klines(
        &self,
        pair: &str,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<Candle>, FetchError> {
        let call = format!("klines:{}:{}", pair, interval.as_str());
        self.record(call.clone());
        let candles = self
            .klines
            .get(&(pair.to_string(), interval))
            .ok_or_else(|| Self::not_found(&call))?;
        Ok(candles.iter().take(limit as usize).copied().collect())
    }
}
