//! Runtime configuration from the command line and environment

use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use clap::{Parser, Subcommand};

use crate::error::{PulseError, PulseResult};
use crate::market::SelectionPolicy;

/// Binance top-coins price bot for Telegram
#[derive(Parser, Debug, Clone)]
#[command(name = "coinpulse", version)]
#[command(about = "Poll Binance, track 1m/1h/24h/7d moves and post them to Telegram")]
pub struct Settings {
    /// Telegram bot token; without it messages are only logged
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Target chat or channel (e.g. @my_channel)
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// Price cache file
    #[arg(long, env = "CACHE_FILE", default_value = "price_cache.json")]
    pub cache_file: PathBuf,

    /// Number of pairs reported each cycle
    #[arg(long, env = "TOP_N", default_value_t = 10)]
    pub top_n: usize,

    /// Quote currency suffix used to filter pairs
    #[arg(long, env = "BASE_QUOTE", default_value = "USDT")]
    pub base_quote: String,

    /// Pair always reported first
    #[arg(long, env = "FAVORITE_SYMBOL", default_value = "BTCUSDT")]
    pub favorite_symbol: String,

    /// Seconds between cycles
    #[arg(long, env = "UPDATE_INTERVAL", default_value_t = 60)]
    pub update_interval: u64,

    /// Currency prices are converted into (USD base)
    #[arg(long, env = "LOCAL_CURRENCY", default_value = "AMD")]
    pub local_currency: String,

    /// Display timezone as hours east of UTC
    #[arg(long, env = "UTC_OFFSET_HOURS", default_value_t = 4, allow_hyphen_values = true)]
    pub utc_offset_hours: i32,

    /// Seconds a fetched chart stays fresh
    #[arg(long, env = "KLINES_TTL", default_value_t = 300)]
    pub klines_ttl: u64,

    /// Pause between consecutive deliveries, in milliseconds
    #[arg(long, env = "SEND_PAUSE_MS", default_value_t = 1000)]
    pub send_pause_ms: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT", default_value_t = 10)]
    pub http_timeout: u64,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Print messages instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Poll and post (default)
    Run,

    /// Print the cached reports as JSON and exit
    Inspect {
        /// Only these symbols
        symbols: Vec<String>,
    },
}

impl Settings {
    /// Reject values the polling loop cannot work with
    pub fn validate(&self) -> PulseResult<()> {
        if self.update_interval == 0 {
            return Err(PulseError::config("UPDATE_INTERVAL must be at least 1 second"));
        }
        if self.base_quote.trim().is_empty() {
            return Err(PulseError::config("BASE_QUOTE must not be empty"));
        }
        if self.utc_offset().is_none() {
            return Err(PulseError::config(format!(
                "UTC_OFFSET_HOURS out of range: {}",
                self.utc_offset_hours
            )));
        }
        if self.http_timeout == 0 {
            return Err(PulseError::config("HTTP_TIMEOUT must be at least 1 second"));
        }
        Ok(())
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy::new(self.base_quote.trim(), self.favorite_symbol.trim(), self.top_n)
    }

    /// Display timezone; `None` outside ±23 hours
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        if self.utc_offset_hours.abs() > 23 {
            return None;
        }
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
    }

    /// Token and chat when both are set and non-empty
    pub fn telegram_credentials(&self) -> Option<(&str, &str)> {
        let token = self.telegram_token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let chat = self.channel_id.as_deref().map(str::trim).filter(|c| !c.is_empty())?;
        Some((token, chat))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    pub fn send_pause(&self) -> Duration {
        Duration::from_millis(self.send_pause_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        let mut argv = vec!["coinpulse"];
        argv.extend_from_slice(args);
        Settings::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_and_subcommand() {
        let settings = parse(&["--top-n", "3", "--base-quote", "BTC", "--once", "--dry-run"]);
        assert_eq!(settings.top_n, 3);
        assert_eq!(settings.base_quote, "BTC");
        assert!(settings.once);
        assert!(settings.dry_run);
        assert_eq!(settings.command(), Command::Run);

        let settings = parse(&["inspect", "BTCUSDT", "ETHUSDT"]);
        assert_eq!(
            settings.command(),
            Command::Inspect { symbols: vec!["BTCUSDT".into(), "ETHUSDT".into()] }
        );
    }

    #[test]
    fn test_validate() {
        let mut settings = parse(&["--update-interval", "30"]);
        settings.base_quote = "USDT".into();
        settings.utc_offset_hours = 4;
        assert!(settings.validate().is_ok());

        settings.update_interval = 0;
        assert!(settings.validate().is_err());

        settings.update_interval = 60;
        settings.base_quote = "  ".into();
        assert!(settings.validate().is_err());

        settings.base_quote = "USDT".into();
        settings.utc_offset_hours = 30;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_negative_offset() {
        let mut settings = parse(&[]);
        settings.utc_offset_hours = -5;
        assert_eq!(settings.utc_offset().unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_telegram_credentials() {
        let mut settings = parse(&[]);
        settings.telegram_token = Some("123:abc".into());
        settings.channel_id = Some("@chan".into());
        assert_eq!(settings.telegram_credentials(), Some(("123:abc", "@chan")));

        settings.channel_id = Some(" ".into());
        assert!(settings.telegram_credentials().is_none());

        settings.channel_id = None;
        assert!(settings.telegram_credentials().is_none());
    }
}
