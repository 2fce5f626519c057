//! Snapshot Pipeline
//!
//! One run: token list -> metadata index -> pair universe -> per-pair
//! enrichment -> filters -> ranking -> snapshot.
//!
//! Only the two listing fetches are fatal. Each pair resolves to a
//! `PairOutcome` value and the run folds those into the final row set, so one
//! unavailable pair never aborts the others.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::config::{Config, PriceSource};
use crate::domain::chain::ChainMatcher;
use crate::domain::metadata::{MetadataIndex, TokenMetadata};
use crate::domain::metrics::{listed_days, PriceWindow};
use crate::domain::ranking::{rank, FilterPolicy, RankOrder};
use crate::domain::row::{EnrichedRow, PairQuote, RowInputs};
use crate::domain::snapshot::{Snapshot, SnapshotError};
use crate::domain::universe::{select_universe, TradingPair};
use crate::ports::market_data::{FetchError, MarketDataPort};
use crate::ports::models::KlineInterval;

/// Fatal pipeline errors. Nothing is written when one occurs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch token list: {0}")]
    TokenList(#[source] FetchError),
    #[error("Failed to fetch exchange info: {0}")]
    ExchangeInfo(#[source] FetchError),
    #[error("Failed to write snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub quote_asset: String,
    pub price_source: PriceSource,
    pub short_interval: KlineInterval,
    pub history_enabled: bool,
    pub history_limit: u32,
    pub recent_listing_days: i64,
    pub concurrency: usize,
    pub target_chain: ChainMatcher,
    pub filters: FilterPolicy,
    pub order: RankOrder,
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            quote_asset: config.universe.quote_asset.clone(),
            price_source: config.enrich.price_source,
            short_interval: config.enrich.short_interval,
            history_enabled: config.enrich.history_enabled,
            history_limit: config.enrich.history_limit,
            recent_listing_days: config.enrich.recent_listing_days,
            concurrency: config.enrich.concurrency.max(1),
            target_chain: config.filters.target_chain.clone(),
            filters: config.filters.policy(),
            order: config.ranking.order,
            top_n: config.ranking.top_n,
        }
    }
}

/// Why a pair produced no row
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Ticker request failed
    Ticker(FetchError),
    /// Short candle request failed
    Candle(FetchError),
    /// Short candle request returned nothing
    NoCandle,
    /// Short candle had a non-positive price
    IncompleteCandle,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Ticker(e) => write!(f, "ticker unavailable: {}", e),
            SkipReason::Candle(e) => write!(f, "candle unavailable: {}", e),
            SkipReason::NoCandle => write!(f, "no candle returned"),
            SkipReason::IncompleteCandle => write!(f, "candle has non-positive prices"),
        }
    }
}

/// Result of enriching one pair
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    Enriched(EnrichedRow),
    /// Rejected by the volume gate before the history request
    BelowVolume { pair: String, quote_volume: f64 },
    Skipped { pair: String, reason: SkipReason },
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pairs in the selected universe
    pub universe: usize,
    /// Dropped by the chain filter before any request
    pub off_chain: usize,
    /// Dropped because market data was unavailable
    pub skipped: usize,
    /// Dropped by the volume gate
    pub below_volume: usize,
    /// Rows in the snapshot
    pub rows: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows from {} pairs ({} skipped, {} below volume, {} off chain)",
            self.rows, self.universe, self.skipped, self.below_volume, self.off_chain
        )
    }
}

/// Snapshot plus run counters
#[derive(Debug, Clone)]
pub struct RunReport {
    pub snapshot: Snapshot,
    pub summary: RunSummary,
}

pub struct SnapshotPipeline<M: MarketDataPort> {
    market: M,
    config: PipelineConfig,
}

impl<M: MarketDataPort> SnapshotPipeline<M> {
    pub fn new(market: M, config: PipelineConfig) -> Self {
        Self { market, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn market(&self) -> &M {
        &self.market
    }

    /// Build a snapshot and write it to `path`
    pub async fn run(&self, path: &Path) -> Result<RunReport, PipelineError> {
        let report = self.build(Utc::now()).await?;
        report.snapshot.save(path)?;
        tracing::info!(
            "Wrote {}: {} [volume gate: {}, chain filter: {}, order: {}]",
            path.display(),
            report.summary,
            self.config
                .filters
                .volume_gate
                .map_or_else(|| "off".to_string(), |min| format!("> {}", min)),
            self.config
                .filters
                .chain
                .as_ref()
                .map_or("off", |chain| chain.name.as_str()),
            self.config.order
        );
        Ok(report)
    }

    /// Build a snapshot as of `now` without writing it
    pub async fn build(&self, now: DateTime<Utc>) -> Result<RunReport, PipelineError> {
        let tokens = self.market.token_list().await.map_err(PipelineError::TokenList)?;
        let index = MetadataIndex::build(&tokens);
        tracing::info!(
            "Indexed {} tokens under {} keys",
            index.record_count(),
            index.len()
        );

        let listing = self.market.exchange_pairs().await.map_err(PipelineError::ExchangeInfo)?;
        let universe = select_universe(listing, &self.config.quote_asset);
        let mut summary = RunSummary {
            universe: universe.len(),
            ..Default::default()
        };
        tracing::info!(
            "{} {} pairs trading, enriching with concurrency {}",
            universe.len(),
            self.config.quote_asset,
            self.config.concurrency
        );

        let empty = Arc::new(TokenMetadata::default());
        let candidates: Vec<(TradingPair, Arc<TokenMetadata>)> = universe
            .into_iter()
            .filter_map(|pair| {
                let meta = index.get(&pair.base_asset).unwrap_or_else(|| Arc::clone(&empty));
                if self.config.filters.admits_chain(&meta.chain_id) {
                    Some((pair, meta))
                } else {
                    None
                }
            })
            .collect();
        summary.off_chain = summary.universe - candidates.len();

        let now_ms = now.timestamp_millis();
        let pending: Vec<_> = candidates
            .iter()
            .map(|(pair, meta)| self.enrich_pair(pair, meta, now_ms))
            .collect();
        let outcomes: Vec<PairOutcome> = stream::iter(pending)
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut rows = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                PairOutcome::Enriched(row) => rows.push(row),
                PairOutcome::BelowVolume { .. } => summary.below_volume += 1,
                PairOutcome::Skipped { pair, reason } => {
                    tracing::debug!("Skipping {}: {}", pair, reason);
                    summary.skipped += 1;
                }
            }
        }

        let enriched = rows.len();
        let kept = self.config.filters.apply(rows);
        summary.below_volume += enriched - kept.len();

        let ranked = rank(kept, self.config.order);
        summary.rows = ranked.len();

        let snapshot = Snapshot::new(now, ranked, self.config.order, self.config.top_n);
        Ok(RunReport { snapshot, summary })
    }

    /// Fetch market data for one pair and turn it into a row
    pub async fn enrich_pair(
        &self,
        pair: &TradingPair,
        meta: &TokenMetadata,
        now_ms: i64,
    ) -> PairOutcome {
        let ticker = match self.market.ticker(&pair.pair_symbol).await {
            Ok(ticker) => ticker,
            Err(e) => return skipped(pair, SkipReason::Ticker(e)),
        };

        if !self.config.filters.admits_volume(ticker.quote_volume) {
            return PairOutcome::BelowVolume {
                pair: pair.pair_symbol.clone(),
                quote_volume: ticker.quote_volume,
            };
        }

        let window = match self.config.price_source {
            PriceSource::Ticker => ticker.window(),
            PriceSource::ShortCandle => match self.short_window(pair).await {
                Ok(window) => window,
                Err(reason) => return skipped(pair, reason),
            },
        };

        let days = if self.config.history_enabled {
            self.listing_age(pair, now_ms).await
        } else {
            None
        };

        let row = EnrichedRow::assemble(
            RowInputs {
                pair,
                meta,
                quote: PairQuote {
                    window,
                    quote_volume: ticker.quote_volume,
                },
                listed_days: days,
            },
            &self.config.target_chain,
            self.config.recent_listing_days,
        );
        PairOutcome::Enriched(row)
    }

    async fn short_window(&self, pair: &TradingPair) -> Result<PriceWindow, SkipReason> {
        let candles = self
            .market
            .klines(&pair.pair_symbol, self.config.short_interval, 1)
            .await
            .map_err(SkipReason::Candle)?;

        let window = candles.last().ok_or(SkipReason::NoCandle)?.window();
        if !window.is_complete() {
            return Err(SkipReason::IncompleteCandle);
        }
        Ok(window)
    }

    /// Days since the first daily candle; `None` when history is unavailable
    async fn listing_age(&self, pair: &TradingPair, now_ms: i64) -> Option<i64> {
        match self
            .market
            .klines(&pair.pair_symbol, KlineInterval::OneDay, self.config.history_limit)
            .await
        {
            Ok(candles) => candles.first().map(|c| listed_days(now_ms, c.open_time)),
            Err(e) => {
                tracing::debug!("No listing history for {}: {}", pair.pair_symbol, e);
                None
            }
        }
    }
}

fn skipped(pair: &TradingPair, reason: SkipReason) -> PairOutcome {
    PairOutcome::Skipped {
        pair: pair.pair_symbol.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::TokenRecord;
    use crate::domain::metrics::{StabilityLabel, MS_PER_DAY};
    use crate::ports::mocks::MockMarketData;
    use crate::ports::models::{Candle, Ticker};
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap()
    }

    fn token(symbol: &str, chain: &str) -> TokenRecord {
        TokenRecord {
            symbol: Some(symbol.to_string()),
            name: Some(format!("{} Token", symbol)),
            chain_id: Some(chain.to_string()),
            contract_address: Some(format!("0x{}", symbol.to_lowercase())),
            ..Default::default()
        }
    }

    fn usdt_pair(base: &str) -> TradingPair {
        TradingPair {
            pair_symbol: format!("{}USDT", base),
            base_asset: base.to_string(),
            quote_asset: "USDT".to_string(),
            status: "TRADING".to_string(),
        }
    }

    fn ticker(open: f64, high: f64, low: f64, volume: f64) -> Ticker {
        Ticker {
            open_price: open,
            high_price: high,
            low_price: low,
            last_price: open,
            quote_volume: volume,
        }
    }

    fn daily_history(days_ago: i64) -> Vec<Candle> {
        vec![Candle {
            open_time: now().timestamp_millis() - days_ago * MS_PER_DAY,
            ..Default::default()
        }]
    }

    fn permissive() -> PipelineConfig {
        PipelineConfig {
            filters: FilterPolicy::permissive(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pipeline_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.quote_asset, "USDT");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.filters.volume_gate, Some(50_000_000.0));
        assert_eq!(config.history_limit, 1500);
    }

    #[tokio::test]
    async fn test_token_list_failure_is_fatal() {
        let pipeline = SnapshotPipeline::new(MockMarketData::new(), permissive());
        let result = pipeline.build(now()).await;
        assert!(matches!(result, Err(PipelineError::TokenList(_))));
    }

    #[tokio::test]
    async fn test_exchange_info_failure_is_fatal() {
        let market = MockMarketData::new().with_tokens(vec![token("FOO", "56")]);
        let pipeline = SnapshotPipeline::new(market, permissive());
        let result = pipeline.build(now()).await;
        assert!(matches!(result, Err(PipelineError::ExchangeInfo(_))));
    }

    #[tokio::test]
    async fn test_enrich_pair_ticker_failure_skips() {
        let pipeline = SnapshotPipeline::new(MockMarketData::new(), permissive());
        let outcome = pipeline
            .enrich_pair(&usdt_pair("FOO"), &TokenMetadata::default(), 0)
            .await;
        assert!(matches!(
            outcome,
            PairOutcome::Skipped { reason: SkipReason::Ticker(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_volume_gate_short_circuits_history() {
        let market = MockMarketData::new()
            .with_ticker("FOOUSDT", ticker(1.0, 1.1, 0.9, 10.0))
            .with_klines("FOOUSDT", KlineInterval::OneDay, daily_history(3));
        let pipeline = SnapshotPipeline::new(market, PipelineConfig::default());

        let outcome = pipeline
            .enrich_pair(&usdt_pair("FOO"), &TokenMetadata::default(), now().timestamp_millis())
            .await;
        assert!(matches!(outcome, PairOutcome::BelowVolume { .. }));
        assert_eq!(pipeline.market().get_calls(), vec!["ticker:FOOUSDT".to_string()]);
    }

    #[tokio::test]
    async fn test_history_failure_degrades_to_unknown_age() {
        let market = MockMarketData::new().with_ticker("FOOUSDT", ticker(10.0, 11.0, 9.0, 1.0));
        let pipeline = SnapshotPipeline::new(market, permissive());
        let meta = TokenRecord::to_metadata(&token("FOO", "56"));

        match pipeline.enrich_pair(&usdt_pair("FOO"), &meta, now().timestamp_millis()).await {
            PairOutcome::Enriched(row) => {
                assert_eq!(row.listed_days, None);
                assert!(!row.recent_on_target_chain);
                assert_relative_eq!(row.volatility, 0.2, epsilon = 1e-12);
            }
            other => panic!("expected row, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_history_is_unknown_age() {
        let market = MockMarketData::new()
            .with_ticker("FOOUSDT", ticker(10.0, 11.0, 9.0, 1.0))
            .with_klines("FOOUSDT", KlineInterval::OneDay, Vec::new());
        let pipeline = SnapshotPipeline::new(market, permissive());

        match pipeline
            .enrich_pair(&usdt_pair("FOO"), &TokenMetadata::default(), now().timestamp_millis())
            .await
        {
            PairOutcome::Enriched(row) => assert_eq!(row.listed_days, None),
            other => panic!("expected row, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_history_disabled_skips_request() {
        let market = MockMarketData::new()
            .with_ticker("FOOUSDT", ticker(10.0, 11.0, 9.0, 1.0))
            .with_klines("FOOUSDT", KlineInterval::OneDay, daily_history(3));
        let config = PipelineConfig {
            history_enabled: false,
            ..permissive()
        };
        let pipeline = SnapshotPipeline::new(market, config);

        let outcome = pipeline
            .enrich_pair(&usdt_pair("FOO"), &TokenMetadata::default(), now().timestamp_millis())
            .await;
        assert!(matches!(outcome, PairOutcome::Enriched(ref row) if row.listed_days.is_none()));
        assert_eq!(pipeline.market().get_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_short_candle_source() {
        let candle = Candle {
            open_time: 0,
            open: 2.0,
            high: 2.1,
            low: 1.9,
            close: 2.05,
            volume: 1.0,
        };
        let market = MockMarketData::new()
            .with_ticker("FOOUSDT", ticker(10.0, 20.0, 5.0, 1.0))
            .with_klines("FOOUSDT", KlineInterval::FiveMinutes, vec![candle]);
        let config = PipelineConfig {
            price_source: PriceSource::ShortCandle,
            history_enabled: false,
            ..permissive()
        };
        let pipeline = SnapshotPipeline::new(market, config);

        match pipeline.enrich_pair(&usdt_pair("FOO"), &TokenMetadata::default(), 0).await {
            PairOutcome::Enriched(row) => {
                assert_relative_eq!(row.volatility, 0.1, epsilon = 1e-12);
                assert_relative_eq!(row.price_change_percent, 2.5, epsilon = 1e-9);
                assert_eq!(row.stability, StabilityLabel::Moderate);
                assert_eq!(row.open_price, 2.0);
            }
            other => panic!("expected row, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_candle_failures_skip() {
        let zero_candle = Candle { open: 0.0, high: 1.0, low: 1.0, close: 1.0, ..Default::default() };
        let market = MockMarketData::new()
            .with_ticker("FOOUSDT", ticker(1.0, 1.0, 1.0, 1.0))
            .with_ticker("BARUSDT", ticker(1.0, 1.0, 1.0, 1.0))
            .with_ticker("BAZUSDT", ticker(1.0, 1.0, 1.0, 1.0))
            .with_klines("BARUSDT", KlineInterval::FiveMinutes, Vec::new())
            .with_klines("BAZUSDT", KlineInterval::FiveMinutes, vec![zero_candle]);
        let config = PipelineConfig {
            price_source: PriceSource::ShortCandle,
            ..permissive()
        };
        let pipeline = SnapshotPipeline::new(market, config);
        let meta = TokenMetadata::default();

        let foo = pipeline.enrich_pair(&usdt_pair("FOO"), &meta, 0).await;
        assert!(matches!(foo, PairOutcome::Skipped { reason: SkipReason::Candle(_), .. }));

        let bar = pipeline.enrich_pair(&usdt_pair("BAR"), &meta, 0).await;
        assert!(matches!(bar, PairOutcome::Skipped { reason: SkipReason::NoCandle, .. }));

        let baz = pipeline.enrich_pair(&usdt_pair("BAZ"), &meta, 0).await;
        assert!(matches!(baz, PairOutcome::Skipped { reason: SkipReason::IncompleteCandle, .. }));
    }

    #[tokio::test]
    async fn test_chain_filter_drops_before_requests() {
        let market = MockMarketData::new()
            .with_tokens(vec![token("FOO", "56"), token("ETHY", "1")])
            .with_pairs(vec![usdt_pair("FOO"), usdt_pair("ETHY"), usdt_pair("NOMETA")])
            .with_ticker("FOOUSDT", ticker(1.0, 1.0, 1.0, 1.0))
            .with_ticker("ETHYUSDT", ticker(1.0, 1.0, 1.0, 1.0));
        let config = PipelineConfig {
            filters: FilterPolicy { volume_gate: None, chain: Some(ChainMatcher::bsc()) },
            history_enabled: false,
            ..Default::default()
        };
        let pipeline = SnapshotPipeline::new(market, config);

        let report = pipeline.build(now()).await.unwrap();
        assert_eq!(report.summary.universe, 3);
        assert_eq!(report.summary.off_chain, 2);
        assert_eq!(report.snapshot.rows.len(), 1);
        assert!(!pipeline.market().get_calls().contains(&"ticker:ETHYUSDT".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_run_matches_sequential() {
        let bases = ["AAA", "BBB", "CCC", "DDD", "EEE", "FFF"];
        let mut market = MockMarketData::new()
            .with_tokens(bases.iter().map(|b| token(b, "56")).collect())
            .with_pairs(bases.iter().map(|b| usdt_pair(b)).collect());
        for (i, base) in bases.iter().enumerate() {
            if i != 2 {
                let high = 1.0 + (i as f64 * 0.37) % 0.5;
                market = market.with_ticker(&format!("{}USDT", base), ticker(1.0, high, 1.0, 1.0));
            }
        }

        let sequential = SnapshotPipeline::new(market.clone(), permissive())
            .build(now())
            .await
            .unwrap();
        let concurrent = SnapshotPipeline::new(market, PipelineConfig { concurrency: 4, ..permissive() })
            .build(now())
            .await
            .unwrap();

        assert_eq!(sequential.snapshot.rows, concurrent.snapshot.rows);
        assert_eq!(concurrent.summary.skipped, 1);
        assert_eq!(concurrent.summary.rows, 5);
    }

    #[test]
    fn test_run_summary_display() {
        let summary = RunSummary { universe: 10, off_chain: 1, skipped: 2, below_volume: 3, rows: 4 };
        assert_eq!(
            summary.to_string(),
            "4 rows from 10 pairs (2 skipped, 3 below volume, 1 off chain)"
        );
    }
}
