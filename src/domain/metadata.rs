//! Token Metadata Index
//!
//! Maps every identifier form a token is known by (alpha id, ticker symbol,
//! contract address) to one shared metadata record. The exchange listing
//! names pairs by base asset, so the index is what joins the listing back to
//! display names and chains.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Canonical metadata for one alpha token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Alpha id (falls back to symbol when the listing has none)
    pub canonical_id: String,
    /// Human readable name
    pub display_name: String,
    /// Ticker shown on the dashboard
    pub short_symbol: String,
    /// Chain identifier as reported by the token list
    pub chain_id: String,
    /// Token contract address on its chain
    pub contract_address: String,
}

/// Raw token-list record after boundary parsing.
///
/// Every field is optional because the token list is loosely typed; the
/// indexer picks the first usable identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRecord {
    pub alpha_id: Option<String>,
    pub id: Option<String>,
    pub token_id: Option<String>,
    pub symbol: Option<String>,
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub chain_id: Option<String>,
    pub contract_address: Option<String>,
}

/// Normalize an identifier for lookup: trimmed and uppercased
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

impl TokenRecord {
    /// Build the metadata record this raw entry describes
    pub fn to_metadata(&self) -> TokenMetadata {
        let canonical = first_non_empty(&[
            self.alpha_id.as_deref(),
            self.id.as_deref(),
            self.token_id.as_deref(),
            self.symbol.as_deref(),
        ])
        .map(normalize_key)
        .unwrap_or_default();

        TokenMetadata {
            canonical_id: canonical,
            display_name: self.name.clone().unwrap_or_default(),
            short_symbol: first_non_empty(&[self.ticker.as_deref(), self.symbol.as_deref()])
                .unwrap_or_default()
                .to_string(),
            chain_id: self.chain_id.clone().unwrap_or_default(),
            contract_address: self.contract_address.clone().unwrap_or_default(),
        }
    }

    /// Normalized lookup keys for this record, empty ones removed
    fn keys(&self, meta: &TokenMetadata) -> Vec<String> {
        let symbol = self.symbol.as_deref().map(normalize_key).unwrap_or_default();
        let contract = normalize_key(&meta.contract_address);

        [meta.canonical_id.clone(), symbol, contract]
            .into_iter()
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Multi-key alias index over token metadata.
///
/// All keys of a record share a single `Arc`; nothing is copied per alias.
/// When two records claim the same key the later one wins.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    entries: HashMap<String, Arc<TokenMetadata>>,
    records: usize,
    collisions: usize,
}

impl MetadataIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from token-list records in listing order
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TokenRecord>,
    {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }

        if index.collisions > 0 {
            tracing::debug!(
                "Metadata index: {} key collisions resolved by last write",
                index.collisions
            );
        }

        index
    }

    /// Insert one record under all of its keys
    pub fn insert(&mut self, record: &TokenRecord) {
        let meta = record.to_metadata();
        let keys = record.keys(&meta);
        if keys.is_empty() {
            return;
        }

        let shared = Arc::new(meta);
        for key in keys {
            if let Some(previous) = self.entries.insert(key, Arc::clone(&shared)) {
                if !Arc::ptr_eq(&previous, &shared) {
                    self.collisions += 1;
                }
            }
        }
        self.records += 1;
    }

    /// Look up metadata by any identifier form
    pub fn get(&self, key: &str) -> Option<Arc<TokenMetadata>> {
        self.entries.get(&normalize_key(key)).cloned()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records that contributed at least one key
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Keys overwritten by a later record
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}
