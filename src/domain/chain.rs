//! Target Chain Matching
//!
//! The token list reports chains inconsistently ("BSC", "bnb", "56", "0x38"),
//! so membership is an alias test rather than an equality check.

use serde::{Deserialize, Serialize};

/// Alias set identifying the target chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainMatcher {
    /// Label used in logs
    pub name: String,
    /// Case-insensitive substrings (e.g. "bsc", "bep20")
    pub aliases: Vec<String>,
    /// Case-insensitive exact ids (e.g. "56", "0x38")
    pub chain_ids: Vec<String>,
}

impl Default for ChainMatcher {
    fn default() -> Self {
        Self::bsc()
    }
}

impl ChainMatcher {
    /// BNB Smart Chain aliases
    pub fn bsc() -> Self {
        Self {
            name: "BSC".to_string(),
            aliases: vec!["bsc".to_string(), "bnb".to_string(), "bep20".to_string()],
            chain_ids: vec!["56".to_string(), "0x38".to_string()],
        }
    }

    /// Whether a reported chain identifier belongs to the target chain
    pub fn matches(&self, chain_id: &str) -> bool {
        let value = chain_id.trim().to_lowercase();
        if value.is_empty() {
            return false;
        }

        self.aliases
            .iter()
            .any(|alias| !alias.is_empty() && value.contains(&alias.to_lowercase()))
            || self.chain_ids.iter().any(|id| value == id.to_lowercase())
    }
}
