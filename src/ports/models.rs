//! Market data models shared between adapters and the pipeline.
//!
//! Values are already coerced: every price and volume is a finite `f64`.

use serde::{Deserialize, Serialize};

use crate::domain::metrics::PriceWindow;

/// 24h ticker for one pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ticker {
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub last_price: f64,
    pub quote_volume: f64,
}

impl Ticker {
    /// The 24h window described by this ticker
    pub fn window(&self) -> PriceWindow {
        PriceWindow::new(self.open_price, self.high_price, self.low_price, self.last_price)
    }
}

/// One kline/candle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Candle {
    /// Open time, epoch milliseconds
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn window(&self) -> PriceWindow {
        PriceWindow::new(self.open, self.high, self.low, self.close)
    }
}

/// Candle intervals the alpha klines endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlineInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl KlineInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::OneMinute => "1m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::OneHour => "1h",
            KlineInterval::FourHours => "4h",
            KlineInterval::OneDay => "1d",
        }
    }
}
