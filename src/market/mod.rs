//! Market data module
//!
//! Provides:
//! - 24h tickers and klines from Binance
//! - USD conversion rates
//! - Favorite-first, volume-ranked pair selection

pub mod types;
pub mod binance;
pub mod fx;
pub mod selection;

pub use types::*;
pub use binance::*;
pub use fx::*;
pub use selection::*;

use crate::error::PulseResult;
use crate::utils::HttpClient;

/// Source of market data for one polling cycle
pub trait MarketFeed {
    /// 24h tickers for every listed pair
    fn tickers(&self) -> PulseResult<Vec<Ticker>>;

    /// Candles for one pair
    fn klines(&self, symbol: &str, interval: &str, limit: u32) -> PulseResult<Vec<Kline>>;

    /// Units of `currency` per 1 USD
    fn usd_rate(&self, currency: &str) -> PulseResult<f64>;
}

/// Binance plus open.er-api.com over HTTP
pub struct LiveFeed {
    binance: BinanceClient,
    fx: FxClient,
}

impl LiveFeed {
    pub fn new(http: HttpClient) -> Self {
        Self {
            binance: BinanceClient::new(http.clone()),
            fx: FxClient::new(http),
        }
    }
}

impl MarketFeed for LiveFeed {
    fn tickers(&self) -> PulseResult<Vec<Ticker>> {
        self.binance.fetch_tickers()
    }

    fn klines(&self, symbol: &str, interval: &str, limit: u32) -> PulseResult<Vec<Kline>> {
        self.binance.fetch_klines(symbol, interval, limit)
    }

    fn usd_rate(&self, currency: &str) -> PulseResult<f64> {
        self.fx.fetch_rate(currency)
    }
}
