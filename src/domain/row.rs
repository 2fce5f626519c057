//! Enriched Row
//!
//! One ranked line of the dashboard. Field names on the wire are the ones the
//! dashboard indexes, so renames here are a breaking change.

use serde::{Deserialize, Serialize};

use super::chain::ChainMatcher;
use super::metadata::TokenMetadata;
use super::metrics::{PriceWindow, StabilityLabel};
use super::universe::TradingPair;

/// Market figures taken from the ticker/candle responses for one pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairQuote {
    pub window: PriceWindow,
    /// 24h quote volume in the quote asset
    pub quote_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRow {
    pub pair: String,
    pub display_name: String,
    pub short_symbol: String,
    pub chain_id: String,
    pub contract_address: String,
    pub price_change_percent: f64,
    pub quote_volume: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub volatility: f64,
    pub stability: StabilityLabel,
    /// `None` when the listing history was unavailable
    pub listed_days: Option<i64>,
    /// Listed on the target chain within the recency window
    #[serde(rename = "fourX")]
    pub recent_on_target_chain: bool,
}

/// Inputs needed to assemble a row
#[derive(Debug, Clone)]
pub struct RowInputs<'a> {
    pub pair: &'a TradingPair,
    pub meta: &'a TokenMetadata,
    pub quote: PairQuote,
    pub listed_days: Option<i64>,
}

impl EnrichedRow {
    /// Join metadata, pair and metrics into a row
    pub fn assemble(inputs: RowInputs<'_>, target: &ChainMatcher, recent_listing_days: i64) -> Self {
        let RowInputs { pair, meta, quote, listed_days } = inputs;
        let volatility = finite_or_zero(quote.window.volatility());
        let change = finite_or_zero(quote.window.change());

        let short_symbol = if meta.short_symbol.is_empty() {
            pair.base_asset.clone()
        } else {
            meta.short_symbol.clone()
        };

        let recent_on_target_chain = target.matches(&meta.chain_id)
            && matches!(listed_days, Some(days) if days <= recent_listing_days);

        Self {
            pair: pair.pair_symbol.clone(),
            display_name: meta.display_name.clone(),
            short_symbol,
            chain_id: meta.chain_id.clone(),
            contract_address: meta.contract_address.clone(),
            price_change_percent: finite_or_zero(change * 100.0),
            quote_volume: finite_or_zero(quote.quote_volume),
            open_price: finite_or_zero(quote.window.open),
            high_price: finite_or_zero(quote.window.high),
            low_price: finite_or_zero(quote.window.low),
            volatility,
            stability: StabilityLabel::classify(volatility),
            listed_days,
            recent_on_target_chain,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
