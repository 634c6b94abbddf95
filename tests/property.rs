use coinpulse::cache::{percent_change, PriceCache, Series, RETENTION_SECS};
use coinpulse::market::{SelectionPolicy, Ticker};
use proptest::prelude::*;

const BASE: i64 = 1_700_000_000;

/// Positive prices, including values with no short decimal form
fn any_price() -> impl Strategy<Value = f64> {
    prop_oneof![
        1e-9f64..1e9,
        (1u32..10_000_000).prop_map(|cents| cents as f64 / 100.0),
        Just(0.1 + 0.2),
        Just(57414.518664216484),
    ]
}

/// Anything the cache accepts, zero included
fn any_stored_price() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0f64), 0.0f64..1e9, any_price()]
}

fn any_samples() -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::vec((0i64..(3 * RETENTION_SECS), any_price()), 1..60)
}

fn any_stored_samples() -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::vec((0i64..(3 * RETENTION_SECS), any_stored_price()), 1..60)
}

fn any_tickers() -> impl Strategy<Value = Vec<Ticker>> {
    let symbol = prop::sample::select(vec![
        "BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT", "ETHBTC", "BNBEUR", "DOGEUSDT", "ADAUSDT",
    ]);
    prop::collection::vec((symbol, 0u32..1_000_000), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(symbol, volume)| Ticker::new(symbol, 1.0, 0.0, volume as f64))
            .collect()
    })
}

proptest! {
    #[test]
    fn series_stays_sorted(samples in any_samples()) {
        let mut cache = PriceCache::new();
        for (offset, price) in &samples {
            cache.append("BTCUSDT", *price, BASE + offset).unwrap();
        }

        let series = cache.series("BTCUSDT").unwrap();
        prop_assert!(series.is_sorted());
        prop_assert!(!series.is_empty());
    }

    #[test]
    fn retention_is_enforced_after_prune(samples in any_samples()) {
        let mut cache = PriceCache::new();
        let mut now = BASE;
        for (offset, price) in &samples {
            let ts = BASE + offset;
            now = now.max(ts);
            cache.append("ETHUSDT", *price, ts).unwrap();
        }

        cache.prune_all(now);
        if let Some(series) = cache.series("ETHUSDT") {
            prop_assert!(series.iter().all(|s| s.timestamp >= now - RETENTION_SECS));
        }
    }

    #[test]
    fn persisted_cache_round_trips(
        btc in any_stored_samples(),
        eth in any_stored_samples(),
    ) {
        let mut cache = PriceCache::new();
        for (offset, price) in &btc {
            cache.append("BTCUSDT", *price, BASE + offset).unwrap();
        }
        for (offset, price) in &eth {
            cache.append("ETHUSDT", *price, BASE + offset).unwrap();
        }

        let mut buffer = Vec::new();
        cache.write_to(&mut buffer).unwrap();
        let loaded = PriceCache::from_reader(buffer.as_slice()).unwrap();
        prop_assert_eq!(loaded, cache);
    }

    #[test]
    fn no_reference_means_no_data(samples in any_samples(), window in 1i64..RETENTION_SECS) {
        let series = Series::from_samples(
            samples.iter().map(|(o, p)| coinpulse::Sample::new(BASE + o, *p)).collect()
        );
        let oldest = series.oldest().unwrap().timestamp;

        // Every sample is newer than `now - window`
        let now = oldest + window - 1;
        prop_assert_eq!(percent_change(&series, now, window), None);
    }

    #[test]
    fn change_uses_latest_prior_sample(
        samples in any_samples(),
        window in 1i64..RETENTION_SECS,
        lag in 0i64..RETENTION_SECS,
    ) {
        let series = Series::from_samples(
            samples.iter().map(|(o, p)| coinpulse::Sample::new(BASE + o, *p)).collect()
        );
        let now = series.latest().unwrap().timestamp + lag;
        let target = now - window;

        let reference = series.iter().filter(|s| s.timestamp <= target).last();
        let latest = series.latest().unwrap();
        let expected = reference.map(|r| (latest.price - r.price) / r.price * 100.0);

        prop_assert_eq!(percent_change(&series, now, window), expected);
    }

    #[test]
    fn selection_respects_limit_and_favorite(tickers in any_tickers(), top_n in 0usize..8) {
        let policy = SelectionPolicy::new("USDT", "BTCUSDT", top_n);
        let selected = policy.select(&tickers);

        prop_assert!(selected.len() <= top_n);
        prop_assert!(selected.iter().all(|t| t.symbol.ends_with("USDT")));

        let has_favorite = tickers.iter().any(|t| t.symbol == "BTCUSDT");
        if has_favorite && top_n > 0 {
            prop_assert_eq!(selected[0].symbol.as_str(), "BTCUSDT");
            prop_assert_eq!(selected.iter().filter(|t| t.symbol == "BTCUSDT").count(), 1);
        }

        let rest: Vec<f64> = selected
            .iter()
            .skip(usize::from(has_favorite))
            .map(|t| t.quote_volume)
            .collect();
        prop_assert!(rest.windows(2).all(|w| w[0] >= w[1]));
    }
}
