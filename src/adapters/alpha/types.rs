//! Alpha API response types
//!
//! The alpha endpoints mix numbers, numeric strings and nulls for the same
//! field. Coercion happens here, once: prices become finite `f64` (0 when
//! unusable) and identifiers become `Option<String>`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::metadata::TokenRecord;
use crate::domain::universe::TradingPair;
use crate::ports::models::{Candle, Ticker};

/// Common `{code, message, data, success}` wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Coerce a JSON value to a finite number, 0 otherwise
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Coerce a JSON value to an epoch-millis timestamp
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_f64).unwrap_or(0.0))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_string))
}

/// A list that may arrive as `null`, read as empty
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Token-list entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawToken {
    #[serde(default, deserialize_with = "lenient_string")]
    pub alpha_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub token_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub chain_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_address: Option<String>,
}

impl From<RawToken> for TokenRecord {
    fn from(raw: RawToken) -> Self {
        TokenRecord {
            alpha_id: raw.alpha_id,
            id: raw.id,
            token_id: raw.token_id,
            symbol: raw.symbol,
            ticker: raw.ticker,
            name: raw.name,
            chain_id: raw.chain_id,
            contract_address: raw.contract_address,
        }
    }
}

/// `get-exchange-info` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symbols: Vec<RawSymbol>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymbol {
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub base_asset: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quote_asset: Option<String>,
}

impl RawSymbol {
    /// Listing entries without a pair symbol are unusable and dropped
    pub fn into_pair(self) -> Option<TradingPair> {
        let pair_symbol = self.symbol.filter(|s| !s.is_empty())?;
        Some(TradingPair {
            pair_symbol,
            base_asset: self.base_asset.unwrap_or_default(),
            quote_asset: self.quote_asset.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
        })
    }
}

/// `ticker` payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicker {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub open_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub high_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub low_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_price: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quote_volume: f64,
}

impl From<RawTicker> for Ticker {
    fn from(raw: RawTicker) -> Self {
        Ticker {
            open_price: raw.open_price,
            high_price: raw.high_price,
            low_price: raw.low_price,
            last_price: raw.last_price,
            quote_volume: raw.quote_volume,
        }
    }
}

/// Parse kline rows `[openTime, open, high, low, close, volume, ...]`.
///
/// Rows shorter than five elements or without an open time are skipped.
pub fn parse_klines(rows: &[Value]) -> Vec<Candle> {
    rows.iter()
        .filter_map(|row| {
            let arr = row.as_array()?;
            if arr.len() < 5 {
                return None;
            }
            let get = |idx: usize| arr.get(idx).map(coerce_f64).unwrap_or(0.0);

            Some(Candle {
                open_time: coerce_i64(&arr[0])?,
                open: get(1),
                high: get(2),
                low: get(3),
                close: get(4),
                volume: get(5),
            })
        })
        .collect()
}
