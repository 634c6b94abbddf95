//! Polling cycle: fetch, select, record, report, deliver, persist

use std::thread;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::cache::{CacheManager, SymbolReport};
use crate::config::Settings;
use crate::error::{PulseError, PulseResult};
use crate::market::{group, Kline, MarketFeed, SelectionPolicy, Ticker, GROUP_SIZE};
use crate::notify::{build_block, render_chart, BlockContext, Chart, Notifier, CHART_INTERVAL, CHART_LIMIT};
use crate::utils::{unix_now, TtlCache};
use crate::{log_debug, log_error, log_info, log_warn};

type KlineKey = (String, String, u32);

/// Queued delivery, in send order
enum Outgoing {
    Text(String),
    Chart(Chart),
}

/// Cycle parameters derived from `Settings`
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub policy: SelectionPolicy,
    pub local_currency: String,
    pub utc_offset: FixedOffset,
    pub klines_ttl: u64,
    pub send_pause: Duration,
    pub interval: Duration,
    pub once: bool,
}

impl RunnerConfig {
    pub fn from_settings(settings: &Settings) -> PulseResult<Self> {
        settings.validate()?;
        let utc_offset = settings
            .utc_offset()
            .ok_or_else(|| PulseError::config("Invalid UTC offset"))?;

        Ok(Self {
            policy: settings.selection_policy(),
            local_currency: settings.local_currency.trim().to_uppercase(),
            utc_offset,
            klines_ttl: settings.klines_ttl,
            send_pause: settings.send_pause(),
            interval: settings.interval(),
            once: settings.once,
        })
    }
}

/// What one cycle did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleSummary {
    /// Pairs chosen by the selection policy
    pub selected: usize,
    /// Samples stored
    pub recorded: usize,
    /// Block messages rendered
    pub blocks: usize,
    /// Messages accepted by the notifier
    pub delivered: usize,
    /// Messages the notifier failed on
    pub failed: usize,
    /// Pairs without a chart this cycle
    pub charts_missing: usize,
    /// Local currency per USD, if the lookup succeeded
    pub rate: Option<f64>,
    /// Whether the cache file was written
    pub persisted: bool,
}

/// Owns the cache and drives cycles against a feed and a notifier
pub struct Runner<F, N> {
    feed: F,
    notifier: N,
    cache: CacheManager,
    klines: TtlCache<KlineKey, Vec<Kline>>,
    config: RunnerConfig,
}

impl<F: MarketFeed, N: Notifier> Runner<F, N> {
    pub fn new(feed: F, notifier: N, cache: CacheManager, config: RunnerConfig) -> Self {
        Self {
            feed,
            notifier,
            cache,
            klines: TtlCache::new(config.klines_ttl),
            config,
        }
    }

    /// One full cycle at `now` (Unix seconds).
    ///
    /// A failed ticker fetch aborts before the cache is touched. Delivery
    /// failures are counted and logged; they never affect the cache.
    pub fn run_cycle(&mut self, now: i64) -> PulseResult<CycleSummary> {
        let tickers = self.feed.tickers()?;
        let selected = self.config.policy.select(&tickers);

        let mut summary = CycleSummary {
            selected: selected.len(),
            ..CycleSummary::default()
        };

        if selected.is_empty() {
            log_warn!(
                "runner",
                "No pairs to report",
                quote = self.config.policy.base_quote,
                tickers = tickers.len()
            );
            return Ok(summary);
        }

        for ticker in &selected {
            if self.cache.record(&ticker.symbol, ticker.last_price, now) {
                summary.recorded += 1;
            }
        }

        let reports: Vec<SymbolReport> = selected
            .iter()
            .map(|ticker| self.report_for(ticker, now))
            .collect();

        summary.rate = match self.feed.usd_rate(&self.config.local_currency) {
            Ok(rate) => Some(rate),
            Err(e) => {
                log_warn!("runner", "No conversion rate", currency = self.config.local_currency, error = e);
                None
            }
        };

        let quote = self.config.policy.base_quote.clone();
        let local_currency = self.config.local_currency.clone();
        let ctx = BlockContext {
            quote: &quote,
            local_currency: &local_currency,
            rate: summary.rate,
            updated_at: local_time(now, self.config.utc_offset),
        };

        let groups = group(&reports, GROUP_SIZE);
        let total_blocks = groups.len();
        let mut rank = 1;
        let mut messages = Vec::new();

        for (index, block) in groups.iter().enumerate() {
            messages.push(Outgoing::Text(build_block(block, index + 1, total_blocks, rank, &ctx)));
            summary.blocks += 1;

            for report in block.iter() {
                match self.chart_klines(&report.symbol, now) {
                    Some(klines) => match render_chart(&report.symbol, ctx.quote, &klines) {
                        Some(chart) => messages.push(Outgoing::Chart(chart)),
                        None => summary.charts_missing += 1,
                    },
                    None => summary.charts_missing += 1,
                }
            }
            rank += block.len();
        }

        for (i, outgoing) in messages.iter().enumerate() {
            if i > 0 {
                pause(self.config.send_pause);
            }
            let sent = match outgoing {
                Outgoing::Text(text) => self.notifier.send_message(text),
                Outgoing::Chart(chart) => self.notifier.send_chart(chart),
            };
            match sent {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    summary.failed += 1;
                    log_error!("runner", "Delivery failed", error = e);
                }
            }
        }

        summary.persisted = self.cache.flush(now);
        self.klines.cleanup(now);
        Ok(summary)
    }

    /// Run cycles until stopped. With `once`, returns the single cycle's outcome.
    pub fn run(&mut self) -> PulseResult<()> {
        loop {
            let now = unix_now();
            let outcome = self.run_cycle(now);

            match &outcome {
                Ok(summary) => log_info!(
                    "runner",
                    "Cycle complete",
                    selected = summary.selected,
                    delivered = summary.delivered,
                    failed = summary.failed,
                    persisted = summary.persisted
                ),
                Err(e) if e.is_transient() => log_warn!("runner", "Cycle skipped", error = e),
                Err(e) => log_error!("runner", "Cycle failed", error = e),
            }

            if self.config.once {
                return outcome.map(|_| ());
            }

            log_debug!("runner", "Sleeping", secs = self.config.interval.as_secs());
            thread::sleep(self.config.interval);
        }
    }

    /// Report with the feed's 24h change. A symbol whose price was rejected
    /// and has no history still gets an entry carrying only the feed values.
    fn report_for(&self, ticker: &Ticker, now: i64) -> SymbolReport {
        self.cache
            .report(&ticker.symbol, now, Some(ticker.change_24h_percent))
            .unwrap_or_else(|| SymbolReport {
                symbol: ticker.symbol.clone(),
                current_price: ticker.last_price,
                change_1m: None,
                change_1h: None,
                change_24h: Some(ticker.change_24h_percent),
                change_7d: None,
            })
    }

    /// Hourly candles for the chart, served from the TTL cache when fresh
    fn chart_klines(&mut self, symbol: &str, now: i64) -> Option<Vec<Kline>> {
        let key = (symbol.to_string(), CHART_INTERVAL.to_string(), CHART_LIMIT);
        if let Some(klines) = self.klines.get(&key, now) {
            log_debug!("runner", "Klines cache hit", symbol = symbol);
            return Some(klines);
        }

        match self.feed.klines(symbol, CHART_INTERVAL, CHART_LIMIT) {
            Ok(klines) if !klines.is_empty() => {
                self.klines.insert(key, klines.clone(), now);
                Some(klines)
            }
            Ok(_) => {
                log_warn!("runner", "No klines", symbol = symbol);
                None
            }
            Err(e) => {
                log_warn!("runner", "Klines fetch failed", symbol = symbol, error = e);
                None
            }
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// `now` in the display timezone
pub fn local_time(now: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc.timestamp_opt(now, 0)
        .single()
        .unwrap_or_else(Utc::now)
        .with_timezone(&offset)
}
