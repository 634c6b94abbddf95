use anyhow::{Context, Result};
use clap::Parser;

use coinpulse::cache::{CacheManager, SymbolReport, RETENTION_SECS};
use coinpulse::utils::{logging, unix_now, HttpClient};
use coinpulse::{
    log_info, log_warn, Command, LiveFeed, LogNotifier, Notifier, Runner, RunnerConfig, Settings,
    TelegramNotifier,
};

fn main() -> Result<()> {
    let settings = Settings::parse();
    if settings.debug {
        logging::enable_debug();
    }

    match settings.command() {
        Command::Run => run(&settings),
        Command::Inspect { symbols } => inspect(&settings, &symbols),
    }
}

fn run(settings: &Settings) -> Result<()> {
    let config = RunnerConfig::from_settings(settings).context("Invalid configuration")?;
    let http = HttpClient::new(settings.http_timeout()).context("Failed to build HTTP client")?;

    let notifier: Box<dyn Notifier> = match settings.telegram_credentials() {
        Some((token, chat)) if !settings.dry_run => {
            Box::new(TelegramNotifier::new(http.clone(), token, chat))
        }
        Some(_) => Box::new(LogNotifier),
        None => {
            if !settings.dry_run {
                log_warn!("main", "TELEGRAM_TOKEN or CHANNEL_ID not set, messages will only be logged");
            }
            Box::new(LogNotifier)
        }
    };

    let cache = CacheManager::open(&settings.cache_file, RETENTION_SECS);
    log_info!(
        "main",
        "Started",
        cache_file = settings.cache_file.display(),
        cached_symbols = cache.cache().len(),
        top_n = settings.top_n,
        interval_secs = settings.update_interval
    );

    let mut runner = Runner::new(LiveFeed::new(http), notifier, cache, config);
    runner.run().context("Cycle failed")?;
    Ok(())
}

/// Print the cached reports as JSON
fn inspect(settings: &Settings, symbols: &[String]) -> Result<()> {
    let manager = CacheManager::open(&settings.cache_file, RETENTION_SECS);
    let wanted: Vec<String> = symbols.iter().map(|s| s.trim().to_uppercase()).collect();

    let reports: Vec<SymbolReport> = manager
        .reports(unix_now())
        .into_iter()
        .filter(|r| wanted.is_empty() || wanted.contains(&r.symbol))
        .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
