//! CoinPulse Core Library
//!
//! Polls Binance for the most traded pairs, keeps a rolling seven-day price
//! cache and posts 1m/1h/24h/7d moves to a Telegram channel.
//!
//! # Architecture
//!
//! This crate provides:
//! - **cache**: Rolling per-symbol price history, window lookups, persistence
//! - **market**: Binance and exchange-rate clients, pair selection
//! - **notify**: Message rendering and Telegram delivery
//! - **runner**: The polling cycle tying them together
//! - **config**: Command line and environment settings
//!
//! # Example
//!
//! ```rust,ignore
//! use coinpulse::cache::{CacheManager, RETENTION_SECS};
//!
//! let mut manager = CacheManager::open("price_cache.json", RETENTION_SECS);
//! manager.record("BTCUSDT", 42000.0, now);
//! let report = manager.report("BTCUSDT", now, None);
//! manager.flush(now);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod market;
pub mod notify;
pub mod runner;
pub mod utils;

// Re-export key types for convenience
pub use cache::{CacheManager, PriceCache, Sample, Series, SymbolReport, Window, RETENTION_SECS};
pub use config::{Command, Settings};
pub use error::{ErrorCode, PulseError, PulseResult};
pub use market::{LiveFeed, MarketFeed, SelectionPolicy, Ticker};
pub use notify::{LogNotifier, Notifier, TelegramNotifier};
pub use runner::{CycleSummary, Runner, RunnerConfig};
