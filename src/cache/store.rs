//! Persistent rolling price store
//!
//! Symbol → `Series` map with prune-on-append retention. On disk it is a
//! JSON object mapping each symbol to `[{"t": <secs>, "p": <price>}, ...]`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::types::{CacheError, Sample, Series, RETENTION_SECS};
use super::window;
use crate::{log_debug, log_info, log_warn};

/// In-memory price history for every tracked symbol
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCache {
    series: BTreeMap<String, Series>,
    retention_secs: i64,
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceCache {
    /// Empty cache with the default 7-day retention
    pub fn new() -> Self {
        Self {
            series: BTreeMap::new(),
            retention_secs: RETENTION_SECS,
        }
    }

    pub fn with_retention(mut self, retention_secs: i64) -> Self {
        self.retention_secs = retention_secs;
        self
    }

    pub fn retention_secs(&self) -> i64 {
        self.retention_secs
    }

    /// Record `price` for `symbol` at `timestamp`, then drop that symbol's
    /// samples older than `timestamp - retention`.
    pub fn append(&mut self, symbol: &str, price: f64, timestamp: i64) -> Result<(), CacheError> {
        if !Sample::is_valid_price(price) {
            return Err(CacheError::InvalidPrice {
                symbol: symbol.to_string(),
                price,
            });
        }

        let series = self.series.entry(symbol.to_string()).or_default();
        series.push(Sample::new(timestamp, price));
        series.prune_before(timestamp - self.retention_secs);
        Ok(())
    }

    /// Prune every series against `now`; series left empty are removed.
    /// Returns the number of samples dropped.
    pub fn prune_all(&mut self, now: i64) -> usize {
        let cutoff = now - self.retention_secs;
        let mut dropped = 0;
        for series in self.series.values_mut() {
            dropped += series.prune_before(cutoff);
        }
        self.series.retain(|_, series| !series.is_empty());
        dropped
    }

    pub fn series(&self, symbol: &str) -> Option<&Series> {
        self.series.get(symbol)
    }

    /// Percent change for `symbol` over `window_seconds`; `None` for unknown symbols
    pub fn percent_change(&self, symbol: &str, now: i64, window_seconds: i64) -> Option<f64> {
        self.series
            .get(symbol)
            .and_then(|series| window::percent_change(series, now, window_seconds))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.series.iter().map(|(symbol, series)| (symbol.as_str(), series))
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn total_samples(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Strict decode. Samples with invalid prices are dropped and every
    /// series is re-sorted by timestamp.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CacheError> {
        let raw: BTreeMap<String, Vec<Sample>> = serde_json::from_reader(reader)?;

        let mut cache = Self::new();
        for (symbol, samples) in raw {
            let before = samples.len();
            let valid: Vec<Sample> = samples
                .into_iter()
                .filter(|s| Sample::is_valid_price(s.price))
                .collect();
            if valid.len() != before {
                log_warn!("cache", "Dropped invalid samples", symbol = symbol, count = before - valid.len());
            }
            cache.series.insert(symbol, Series::from_samples(valid));
        }
        Ok(cache)
    }

    /// Decode, falling back to an empty cache on malformed input
    pub fn load<R: Read>(reader: R) -> Self {
        match Self::from_reader(reader) {
            Ok(cache) => cache,
            Err(e) => {
                log_warn!("cache", "Cache unreadable, starting empty", error = e);
                Self::new()
            }
        }
    }

    /// Strict encode
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), CacheError> {
        serde_json::to_writer(&mut writer, &self.series)?;
        writer.flush()?;
        Ok(())
    }

    /// Best-effort encode; failures are logged. Returns whether it succeeded.
    pub fn persist<W: Write>(&self, writer: W) -> bool {
        match self.write_to(writer) {
            Ok(()) => true,
            Err(e) => {
                log_warn!("cache", "Cache write failed", error = e);
                false
            }
        }
    }

    /// Load from `path`; a missing file is a normal cold start
    pub fn load_file(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log_info!("cache", "No cache file, cold start", path = path.display());
                return Self::new();
            }
            Err(e) => {
                log_warn!("cache", "Cache file unreadable, starting empty", path = path.display(), error = e);
                return Self::new();
            }
        };

        let cache = Self::load(BufReader::new(file));
        log_debug!("cache", "Cache loaded", symbols = cache.len(), samples = cache.total_samples());
        cache
    }

    /// Write to a temporary sibling, then rename over `path`
    pub fn write_file(&self, path: &Path) -> Result<(), CacheError> {
        let temp_path = path.with_extension("tmp");
        let file = File::create(&temp_path)?;
        self.write_to(BufWriter::new(file))?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Best-effort `write_file`; failures are logged
    pub fn persist_file(&self, path: &Path) -> bool {
        match self.write_file(path) {
            Ok(()) => true,
            Err(e) => {
                log_warn!("cache", "Cache not saved", path = path.display(), error = e);
                false
            }
        }
    }
}
