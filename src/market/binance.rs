//! Binance REST client for ticker and kline data
//!
//! API Endpoints used:
//! - /api/v3/ticker/24hr - 24h statistics for every pair
//! - /api/v3/klines - Candlestick data

use super::types::*;
use crate::error::{PulseError, PulseResult};
use crate::log_debug;
use crate::utils::{parse_json, HttpClient};

/// Binance API base URL
pub const BINANCE_API_BASE: &str = "https://api.binance.com";

/// Binance API client
#[derive(Clone)]
pub struct BinanceClient {
    /// API base URL
    pub base_url: String,
    http: HttpClient,
}

impl BinanceClient {
    pub fn new(http: HttpClient) -> Self {
        Self::with_base_url(http, BINANCE_API_BASE)
    }

    pub fn with_base_url(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// GET /api/v3/ticker/24hr
    pub fn ticker_24hr_url(&self) -> String {
        format!("{}/api/v3/ticker/24hr", self.base_url)
    }

    /// GET /api/v3/klines?symbol={symbol}&interval={interval}&limit={limit}
    pub fn klines_url(&self) -> String {
        format!("{}/api/v3/klines", self.base_url)
    }

    pub fn klines_query(symbol: &str, interval: &str, limit: u32) -> Vec<(&'static str, String)> {
        vec![
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ]
    }

    /// Fetch 24h tickers for every pair
    pub fn fetch_tickers(&self) -> PulseResult<Vec<Ticker>> {
        let body = self.http.get(&self.ticker_24hr_url(), &[])?.text()?;
        Self::parse_tickers(&body)
    }

    /// Fetch candles for one pair
    pub fn fetch_klines(&self, symbol: &str, interval: &str, limit: u32) -> PulseResult<Vec<Kline>> {
        let query = Self::klines_query(symbol, interval, limit);
        let body = self.http.get(&self.klines_url(), &query)?.text()?;
        Self::parse_klines(&body)
    }

    /// Parse the `/ticker/24hr` array, skipping malformed entries
    pub fn parse_tickers(json: &str) -> PulseResult<Vec<Ticker>> {
        let parsed: serde_json::Value = parse_json(json)?;
        let entries = parsed
            .as_array()
            .ok_or_else(|| PulseError::parse_error("Ticker response is not an array"))?;

        let tickers: Vec<Ticker> = entries.iter().filter_map(Ticker::from_json).collect();
        if tickers.len() != entries.len() {
            log_debug!("binance", "Skipped malformed tickers", skipped = entries.len() - tickers.len());
        }
        Ok(tickers)
    }

    /// Parse the `/klines` array, skipping malformed candles
    pub fn parse_klines(json: &str) -> PulseResult<Vec<Kline>> {
        let parsed: serde_json::Value = parse_json(json)?;
        let entries = parsed
            .as_array()
            .ok_or_else(|| PulseError::parse_error("Kline response is not an array"))?;

        Ok(entries.iter().filter_map(Kline::from_json).collect())
    }
}
