//! Market data types

use serde::{Deserialize, Serialize};

use crate::utils::{get_json_f64, get_json_string, json_to_f64};

/// 24h ticker snapshot for one trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    /// Pair symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Last traded price in the quote currency
    pub last_price: f64,
    /// Provider's own 24h percent change
    pub change_24h_percent: f64,
    /// 24h traded volume in the quote currency
    pub quote_volume: f64,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, last_price: f64, change_24h_percent: f64, quote_volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            last_price,
            change_24h_percent,
            quote_volume,
        }
    }

    /// Parse one entry of Binance's `/ticker/24hr` array.
    /// Returns `None` when any field is missing or malformed.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let symbol = get_json_string(value, "symbol").filter(|s| !s.is_empty())?;
        let last_price = get_json_f64(value, "lastPrice").filter(|p| *p >= 0.0)?;
        let change_24h_percent = get_json_f64(value, "priceChangePercent")?;
        let quote_volume = get_json_f64(value, "quoteVolume")?;

        Some(Self {
            symbol,
            last_price,
            change_24h_percent,
            quote_volume,
        })
    }
}

/// OHLC candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// Open time, Unix milliseconds
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Kline {
    pub fn new(open_time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { open_time, open, high, low, close }
    }

    /// Parse `[openTime, "open", "high", "low", "close", ...]`
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let arr = value.as_array()?;
        if arr.len() < 5 {
            return None;
        }

        Some(Self {
            open_time: arr[0].as_i64()?,
            open: json_to_f64(&arr[1])?,
            high: json_to_f64(&arr[2])?,
            low: json_to_f64(&arr[3])?,
            close: json_to_f64(&arr[4])?,
        })
    }
}
