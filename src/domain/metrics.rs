//! Range Metrics
//!
//! Volatility here is the simple range proxy `(high - low) / open` over one
//! price window, not a statistical deviation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Milliseconds in one day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Volatility below this is "stable"
pub const STABLE_THRESHOLD: f64 = 0.05;
/// Volatility below this (and above stable) is "moderate"
pub const MODERATE_THRESHOLD: f64 = 0.15;

/// OHLC values of one price window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceWindow {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceWindow {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { open, high, low, close }
    }

    /// `(high - low) / open`, or 0 when open is not positive
    pub fn volatility(&self) -> f64 {
        guarded_ratio(self.high - self.low, self.open)
    }

    /// `(close - open) / open`, or 0 when open is not positive
    pub fn change(&self) -> f64 {
        guarded_ratio(self.close - self.open, self.open)
    }

    /// Every price strictly positive
    pub fn is_complete(&self) -> bool {
        self.open > 0.0 && self.high > 0.0 && self.low > 0.0 && self.close > 0.0
    }
}

fn guarded_ratio(numerator: f64, open: f64) -> f64 {
    if open > 0.0 {
        let ratio = numerator / open;
        if ratio.is_finite() {
            return ratio;
        }
    }
    0.0
}

/// Stability bucket derived from volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityLabel {
    Stable,
    Moderate,
    Poor,
}

impl StabilityLabel {
    /// Classify a volatility value with the fixed thresholds
    pub fn classify(volatility: f64) -> Self {
        if volatility < STABLE_THRESHOLD {
            StabilityLabel::Stable
        } else if volatility < MODERATE_THRESHOLD {
            StabilityLabel::Moderate
        } else {
            StabilityLabel::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityLabel::Stable => "stable",
            StabilityLabel::Moderate => "moderate",
            StabilityLabel::Poor => "poor",
        }
    }
}

impl fmt::Display for StabilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days between the first candle open and `now`, both epoch millis.
/// Out-of-range timestamps saturate instead of overflowing.
pub fn listed_days(now_ms: i64, first_open_ms: i64) -> i64 {
    now_ms.saturating_sub(first_open_ms).div_euclid(MS_PER_DAY)
}
