//! Alpha Market API Client
//!
//! `MarketDataPort` over the public alpha endpoints. No authentication; every
//! request is a plain GET through `HttpFetcher`.

use async_trait::async_trait;
use serde_json::Value;

use crate::adapters::http::{build_url, HttpFetcher};
use crate::domain::metadata::TokenRecord;
use crate::domain::universe::TradingPair;
use crate::ports::market_data::{FetchError, MarketDataPort};
use crate::ports::models::{Candle, KlineInterval, Ticker};
use super::types::{parse_klines, ApiEnvelope, ExchangeInfo, RawTicker, RawToken};

/// Alpha API endpoint URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaEndpoints {
    pub token_list_url: String,
    pub exchange_info_url: String,
    pub ticker_url: String,
    pub klines_url: String,
}

impl Default for AlphaEndpoints {
    fn default() -> Self {
        Self {
            token_list_url: "https://www.binance.com/bapi/defi/v1/public/wallet-direct/buw/wallet/cex/alpha/all/token/list".to_string(),
            exchange_info_url: "https://www.binance.com/bapi/defi/v1/public/alpha-trade/get-exchange-info".to_string(),
            ticker_url: "https://www.binance.com/bapi/defi/v1/public/alpha-trade/ticker".to_string(),
            klines_url: "https://www.binance.com/bapi/defi/v1/public/alpha-trade/klines".to_string(),
        }
    }
}

impl AlphaEndpoints {
    pub fn ticker(&self, pair: &str) -> Result<String, FetchError> {
        build_url(&self.ticker_url, &[("symbol", pair)])
    }

    pub fn klines(&self, pair: &str, interval: KlineInterval, limit: u32) -> Result<String, FetchError> {
        build_url(
            &self.klines_url,
            &[
                ("interval", interval.as_str()),
                ("limit", &limit.to_string()),
                ("symbol", pair),
            ],
        )
    }
}

/// Alpha market data client
#[derive(Debug, Clone)]
pub struct AlphaClient {
    endpoints: AlphaEndpoints,
    fetcher: HttpFetcher,
}

impl AlphaClient {
    pub fn new(endpoints: AlphaEndpoints, fetcher: HttpFetcher) -> Self {
        Self { endpoints, fetcher }
    }

    pub fn endpoints(&self) -> &AlphaEndpoints {
        &self.endpoints
    }

    async fn fetch_data<T>(&self, url: &str) -> Result<Option<T>, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let envelope: ApiEnvelope<T> = self.fetcher.fetch_json(url).await?;
        if envelope.success == Some(false) {
            tracing::debug!(
                "Alpha API reported failure for {}: code={:?} message={:?}",
                url,
                envelope.code,
                envelope.message
            );
        }
        Ok(envelope.data)
    }
}

#[async_trait]
impl MarketDataPort for AlphaClient {
    async fn token_list(&self) -> Result<Vec<TokenRecord>, FetchError> {
        let tokens: Vec<RawToken> = self
            .fetch_data(&self.endpoints.token_list_url)
            .await?
            .unwrap_or_default();

        Ok(tokens.into_iter().map(TokenRecord::from).collect())
    }

    async fn exchange_pairs(&self) -> Result<Vec<TradingPair>, FetchError> {
        let info: ExchangeInfo = self
            .fetch_data(&self.endpoints.exchange_info_url)
            .await?
            .unwrap_or_default();

        Ok(info.symbols.into_iter().filter_map(|s| s.into_pair()).collect())
    }

    async fn ticker(&self, pair: &str) -> Result<Ticker, FetchError> {
        let url = self.endpoints.ticker(pair)?;
        let raw: RawTicker = self
            .fetch_data(&url)
            .await?
            .ok_or(FetchError::MissingData { url })?;

        Ok(Ticker::from(raw))
    }

    async fn klines(
        &self,
        pair: &str,
        interval: KlineInterval,
        limit: u32,
    ) -> Result<Vec<Candle>, FetchError> {
        let url = self.endpoints.klines(pair, interval, limit)?;
        let rows: Vec<Value> = self.fetch_data(&url).await?.unwrap_or_default();
        Ok(parse_klines(&rows))
    }
}
