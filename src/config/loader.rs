//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching
//! config/alpha-watch.toml. Every section is optional; missing keys fall back
//! to the defaults the public dashboard runs with.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::alpha::AlphaEndpoints;
use crate::adapters::http::{HttpConfig, DEFAULT_USER_AGENT};
use crate::domain::chain::ChainMatcher;
use crate::domain::ranking::{FilterPolicy, RankOrder};
use crate::domain::snapshot::DEFAULT_SNAPSHOT_FILE;
use crate::ports::models::KlineInterval;

/// Environment variable overriding `[output] dir`
pub const OUTPUT_DIR_ENV: &str = "ALPHA_WATCH_OUTPUT_DIR";

/// Maximum candles the klines endpoint returns in one call
pub const MAX_HISTORY_LIMIT: u32 = 1500;

/// Main configuration structure matching alpha-watch.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSection,
    pub universe: UniverseSection,
    pub enrich: EnrichSection,
    pub filters: FiltersSection,
    pub ranking: RankingSection,
    pub output: OutputSection,
    pub logging: LoggingSection,
}

/// Alpha API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub token_list_url: String,
    pub exchange_info_url: String,
    pub ticker_url: String,
    pub klines_url: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        let endpoints = AlphaEndpoints::default();
        Self {
            token_list_url: endpoints.token_list_url,
            exchange_info_url: endpoints.exchange_info_url,
            ticker_url: endpoints.ticker_url,
            klines_url: endpoints.klines_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiSection {
    pub fn endpoints(&self) -> AlphaEndpoints {
        AlphaEndpoints {
            token_list_url: self.token_list_url.clone(),
            exchange_info_url: self.exchange_info_url.clone(),
            ticker_url: self.ticker_url.clone(),
            klines_url: self.klines_url.clone(),
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Pair universe configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UniverseSection {
    /// Quote asset pairs must be priced in
    pub quote_asset: String,
}

impl Default for UniverseSection {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
        }
    }
}

/// Where the OHLC window for volatility comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// 24h ticker open/high/low/last
    #[default]
    Ticker,
    /// Most recent short-interval candle
    ShortCandle,
}

/// Enrichment configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichSection {
    pub price_source: PriceSource,
    /// Candle interval used with `price_source = "short_candle"`
    pub short_interval: KlineInterval,
    /// Fetch daily history to estimate listing age
    pub history_enabled: bool,
    /// Daily candles requested for listing age (1..=1500)
    pub history_limit: u32,
    /// Listings at most this many days old count as recent
    pub recent_listing_days: i64,
    /// Pairs enriched concurrently (1 = sequential)
    pub concurrency: usize,
}

impl Default for EnrichSection {
    fn default() -> Self {
        Self {
            price_source: PriceSource::Ticker,
            short_interval: KlineInterval::FiveMinutes,
            history_enabled: true,
            history_limit: MAX_HISTORY_LIMIT,
            recent_listing_days: 30,
            concurrency: 1,
        }
    }
}

/// Row filter configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FiltersSection {
    pub volume_gate_enabled: bool,
    /// Minimum 24h quote volume (exclusive)
    pub min_quote_volume: f64,
    /// Keep only pairs on the target chain
    pub chain_filter_enabled: bool,
    /// Target chain aliases, also used for the recent-listing flag
    pub target_chain: ChainMatcher,
}

impl Default for FiltersSection {
    fn default() -> Self {
        Self {
            volume_gate_enabled: true,
            min_quote_volume: 50_000_000.0,
            chain_filter_enabled: false,
            target_chain: ChainMatcher::bsc(),
        }
    }
}

impl FiltersSection {
    pub fn policy(&self) -> FilterPolicy {
        FilterPolicy {
            volume_gate: self.volume_gate_enabled.then_some(self.min_quote_volume),
            chain: self.chain_filter_enabled.then(|| self.target_chain.clone()),
        }
    }
}

/// Ranking configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingSection {
    /// "ascending" (calmest first) or "descending"
    pub order: RankOrder,
    /// Size of the precomputed top subset
    pub top_n: usize,
}

impl Default for RankingSection {
    fn default() -> Self {
        Self {
            order: RankOrder::LowestVolatility,
            top_n: 10,
        }
    }
}

/// Snapshot output configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory the snapshot is written to (`~` is expanded)
    pub dir: String,
    pub file_name: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: "docs".to_string(),
            file_name: DEFAULT_SNAPSHOT_FILE.to_string(),
        }
    }
}

impl OutputSection {
    /// Get output directory with environment variable override
    /// Checks ALPHA_WATCH_OUTPUT_DIR first, falls back to config value
    pub fn get_dir(&self) -> String {
        std::env::var(OUTPUT_DIR_ENV)
            .ok()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| self.dir.clone())
    }

    /// Full snapshot path after overrides and `~` expansion
    pub fn snapshot_path(&self) -> PathBuf {
        let dir = shellexpand::tilde(&self.get_dir()).to_string();
        Path::new(&dir).join(&self.file_name)
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration, falling back to defaults when the file does not exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        let config = Config::default();
        config.validate()?;
        return Ok(config);
    }
    load_config(path)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate API section
        for (name, url) in [
            ("token_list_url", &self.api.token_list_url),
            ("exchange_info_url", &self.api.exchange_info_url),
            ("ticker_url", &self.api.ticker_url),
            ("klines_url", &self.api.klines_url),
        ] {
            if url.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.universe.quote_asset.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "quote_asset cannot be empty".to_string(),
            ));
        }

        // Validate enrichment
        if self.enrich.history_limit == 0 || self.enrich.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "history_limit must be 1-{}, got {}",
                MAX_HISTORY_LIMIT, self.enrich.history_limit
            )));
        }

        if self.enrich.recent_listing_days < 0 {
            return Err(ConfigError::ValidationError(format!(
                "recent_listing_days must be >= 0, got {}",
                self.enrich.recent_listing_days
            )));
        }

        if self.enrich.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "concurrency must be > 0".to_string(),
            ));
        }

        // Validate filters
        if !self.filters.min_quote_volume.is_finite() || self.filters.min_quote_volume < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_quote_volume must be >= 0, got {}",
                self.filters.min_quote_volume
            )));
        }

        let chain = &self.filters.target_chain;
        if chain.aliases.iter().all(|a| a.is_empty()) && chain.chain_ids.iter().all(|c| c.is_empty()) {
            return Err(ConfigError::ValidationError(
                "target_chain needs at least one alias or chain id".to_string(),
            ));
        }

        // Validate ranking and output
        if self.ranking.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "top_n must be > 0".to_string(),
            ));
        }

        if self.output.file_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "file_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
