//! Symbol Universe Selection
//!
//! Narrows the exchange listing down to the pairs worth enriching.

/// Listing status of a tradable pair
pub const STATUS_TRADING: &str = "TRADING";

/// A pair as listed by the exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingPair {
    /// Exchange pair symbol (e.g. "ALPHA_1USDT")
    pub pair_symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    /// Raw status string ("TRADING", "BREAK", ...)
    pub status: String,
}

impl TradingPair {
    /// Whether the pair is currently open for trading
    pub fn is_trading(&self) -> bool {
        self.status == STATUS_TRADING
    }
}

/// Keep trading pairs quoted in `quote_asset`, preserving listing order
pub fn select_universe(pairs: Vec<TradingPair>, quote_asset: &str) -> Vec<TradingPair> {
    pairs
        .into_iter()
        .filter(|p| p.is_trading() && p.quote_asset == quote_asset)
        .collect()
}
