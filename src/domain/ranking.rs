//! Ranking and Filtering
//!
//! Applies the deployment's row filters, orders rows by volatility and slices
//! the top-N view shown above the full table.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::chain::ChainMatcher;
use super::row::EnrichedRow;

/// Direction of the volatility ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankOrder {
    /// Calmest pairs first
    #[default]
    #[serde(rename = "ascending")]
    LowestVolatility,
    /// Most volatile pairs first
    #[serde(rename = "descending")]
    HighestVolatility,
}

impl fmt::Display for RankOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankOrder::LowestVolatility => write!(f, "ascending"),
            RankOrder::HighestVolatility => write!(f, "descending"),
        }
    }
}

/// Row filters enabled for a deployment
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPolicy {
    /// Minimum 24h quote volume (exclusive); `None` disables the gate
    pub volume_gate: Option<f64>,
    /// Restrict rows to this chain when set
    pub chain: Option<ChainMatcher>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            volume_gate: Some(50_000_000.0),
            chain: None,
        }
    }
}

impl FilterPolicy {
    /// No filtering at all
    pub fn permissive() -> Self {
        Self { volume_gate: None, chain: None }
    }

    /// Chain part of the policy, usable before any market data is fetched
    pub fn admits_chain(&self, chain_id: &str) -> bool {
        self.chain.as_ref().map_or(true, |m| m.matches(chain_id))
    }

    pub fn admits_volume(&self, quote_volume: f64) -> bool {
        self.volume_gate.map_or(true, |min| quote_volume > min)
    }

    pub fn admits(&self, row: &EnrichedRow) -> bool {
        self.admits_chain(&row.chain_id) && self.admits_volume(row.quote_volume)
    }

    /// Drop rows rejected by the policy
    pub fn apply(&self, rows: Vec<EnrichedRow>) -> Vec<EnrichedRow> {
        rows.into_iter().filter(|r| self.admits(r)).collect()
    }
}

/// Sort rows by volatility in the given direction.
///
/// Duplicate pair symbols keep their first occurrence. The sort is stable, so
/// ties keep request order.
pub fn rank(rows: Vec<EnrichedRow>, order: RankOrder) -> Vec<EnrichedRow> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<EnrichedRow> = rows
        .into_iter()
        .filter(|r| seen.insert(r.pair.clone()))
        .collect();

    match order {
        RankOrder::LowestVolatility => ranked.sort_by(|a, b| a.volatility.total_cmp(&b.volatility)),
        RankOrder::HighestVolatility => ranked.sort_by(|a, b| b.volatility.total_cmp(&a.volatility)),
    }

    ranked
}

/// First `n` rows of an already ranked set
pub fn top_n(ranked: &[EnrichedRow], n: usize) -> Vec<EnrichedRow> {
    ranked.iter().take(n).cloned().collect()
}
