//! Cache lifecycle: load once at start, record every cycle, flush once per cycle

use std::path::PathBuf;

use super::store::PriceCache;
use super::types::SymbolReport;
use super::window::{self, Window};
use crate::{log_debug, log_warn};

/// Owns the price cache for the lifetime of the polling loop
pub struct CacheManager {
    path: PathBuf,
    cache: PriceCache,
}

impl CacheManager {
    /// Load the cache from `path`; any failure means a cold start
    pub fn open(path: impl Into<PathBuf>, retention_secs: i64) -> Self {
        let path = path.into();
        let cache = PriceCache::load_file(&path).with_retention(retention_secs);
        Self { path, cache }
    }

    /// Record the current price of `symbol`. Invalid prices are logged and
    /// skipped; returns whether the sample was stored.
    pub fn record(&mut self, symbol: &str, price: f64, now: i64) -> bool {
        match self.cache.append(symbol, price, now) {
            Ok(()) => true,
            Err(e) => {
                log_warn!("cache", "Sample rejected", symbol = symbol, error = e);
                false
            }
        }
    }

    /// Structured result for `symbol`. `feed_change_24h` takes precedence
    /// over the cached 24h window when the feed supplies it.
    pub fn report(&self, symbol: &str, now: i64, feed_change_24h: Option<f64>) -> Option<SymbolReport> {
        let series = self.cache.series(symbol)?;
        let current = series.latest()?;

        Some(SymbolReport {
            symbol: symbol.to_string(),
            current_price: current.price,
            change_1m: window::change_for(series, now, Window::Minute1),
            change_1h: window::change_for(series, now, Window::Hour1),
            change_24h: feed_change_24h
                .or_else(|| window::change_for(series, now, Window::Hour24)),
            change_7d: window::change_for(series, now, Window::Day7),
        })
    }

    /// Reports for every cached symbol, 24h from the cache
    pub fn reports(&self, now: i64) -> Vec<SymbolReport> {
        self.cache
            .symbols()
            .filter_map(|symbol| self.report(symbol, now, None))
            .collect()
    }

    /// Prune every series and persist once. Returns whether the file was written.
    pub fn flush(&mut self, now: i64) -> bool {
        let dropped = self.cache.prune_all(now);
        log_debug!("cache", "Pruned", dropped = dropped, symbols = self.cache.len());
        self.cache.persist_file(&self.path)
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }
}
