//! Price cache types and data structures

use serde::{Deserialize, Deserializer, Serialize};

use super::window::Window;

/// How long samples are kept (7 days)
pub const RETENTION_SECS: i64 = 7 * 86_400;

/// Single observed price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unix timestamp in seconds
    #[serde(rename = "t", deserialize_with = "deserialize_timestamp")]
    pub timestamp: i64,
    /// Last traded price in the quote currency
    #[serde(rename = "p")]
    pub price: f64,
}

impl Sample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Finite and non-negative
    pub fn is_valid_price(price: f64) -> bool {
        price.is_finite() && price >= 0.0
    }
}

/// Older cache files stored fractional seconds
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Int(i64),
        Float(f64),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Int(t) => Ok(t),
        RawTimestamp::Float(t) if t.is_finite() => Ok(t.trunc() as i64),
        RawTimestamp::Float(t) => Err(serde::de::Error::custom(format!("invalid timestamp {}", t))),
    }
}

/// Samples of one symbol, ordered by non-decreasing timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from samples in any order (stable sort by timestamp)
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    /// Insert a sample after every sample with timestamp <= its own.
    /// In the periodic case this is a plain push.
    pub fn push(&mut self, sample: Sample) {
        let idx = self.samples.partition_point(|s| s.timestamp <= sample.timestamp);
        if idx == self.samples.len() {
            self.samples.push(sample);
        } else {
            self.samples.insert(idx, sample);
        }
    }

    /// Drop every sample with `timestamp < cutoff`; returns how many were dropped
    pub fn prune_before(&mut self, cutoff: i64) -> usize {
        let idx = self.samples.partition_point(|s| s.timestamp < cutoff);
        self.samples.drain(..idx);
        idx
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Oldest retained sample
    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// Most recent sample with `timestamp <= target`
    pub fn reference_at(&self, target: i64) -> Option<&Sample> {
        let idx = self.samples.partition_point(|s| s.timestamp <= target);
        idx.checked_sub(1).map(|i| &self.samples[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check the ordering invariant
    pub fn is_sorted(&self) -> bool {
        self.samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }
}

/// Per-symbol result handed to the renderer each cycle.
/// `None` means "no data" for that window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub current_price: f64,
    pub change_1m: Option<f64>,
    pub change_1h: Option<f64>,
    pub change_24h: Option<f64>,
    pub change_7d: Option<f64>,
}

impl SymbolReport {
    /// Change for a named window
    pub fn change(&self, window: Window) -> Option<f64> {
        match window {
            Window::Minute1 => self.change_1m,
            Window::Hour1 => self.change_1h,
            Window::Hour24 => self.change_24h,
            Window::Day7 => self.change_7d,
        }
    }
}

/// Cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Invalid price {price} for {symbol}")]
    InvalidPrice { symbol: String, price: f64 },
}
