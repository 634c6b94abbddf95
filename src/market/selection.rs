//! Which pairs to report each cycle: favorite first, then by quote volume

use std::cmp::Ordering;

use super::types::Ticker;

/// Coins per notification block
pub const GROUP_SIZE: usize = 5;

/// Ranking/selection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Quote suffix every selected symbol must carry (e.g., "USDT")
    pub base_quote: String,
    /// Symbol always placed first when listed (e.g., "BTCUSDT")
    pub favorite: String,
    /// Maximum number of selected symbols
    pub top_n: usize,
}

impl SelectionPolicy {
    pub fn new(base_quote: impl Into<String>, favorite: impl Into<String>, top_n: usize) -> Self {
        Self {
            base_quote: base_quote.into(),
            favorite: favorite.into(),
            top_n,
        }
    }

    /// Pairs quoted in `base_quote`, sorted by quote volume descending.
    /// Ties keep provider order.
    pub fn ranked<'a>(&self, tickers: &'a [Ticker]) -> Vec<&'a Ticker> {
        let mut pairs: Vec<&Ticker> = tickers
            .iter()
            .filter(|t| t.symbol.ends_with(&self.base_quote))
            .collect();

        pairs.sort_by(|a, b| {
            b.quote_volume
                .partial_cmp(&a.quote_volume)
                .unwrap_or(Ordering::Equal)
        });
        pairs
    }

    /// Up to `top_n` pairs: the favorite first (when listed), then the rest
    /// by volume. Empty when nothing matches the quote filter.
    pub fn select(&self, tickers: &[Ticker]) -> Vec<Ticker> {
        if self.top_n == 0 {
            return Vec::new();
        }

        let ranked = self.ranked(tickers);
        let favorite = ranked
            .iter()
            .find(|t| !self.favorite.is_empty() && t.symbol == self.favorite);

        let mut selected: Vec<Ticker> = Vec::with_capacity(self.top_n);
        if let Some(fav) = favorite {
            selected.push((*fav).clone());
        }

        for ticker in &ranked {
            if selected.len() >= self.top_n {
                break;
            }
            if favorite.is_some() && ticker.symbol == self.favorite {
                continue;
            }
            selected.push((*ticker).clone());
        }

        selected
    }
}

/// Split into consecutive groups of `size`, preserving order; the last
/// group may be shorter.
pub fn group<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str, volume: f64) -> Ticker {
        Ticker::new(symbol, 1.0, 0.0, volume)
    }

    fn symbols(selected: &[Ticker]) -> Vec<&str> {
        selected.iter().map(|t| t.symbol.as_str()).collect()
    }

    #[test]
    fn test_favorite_first_then_volume() {
        let tickers = vec![ticker("A", 10.0), ticker("B", 50.0), ticker("FAV", 1.0)];
        let policy = SelectionPolicy::new("", "FAV", 3);
        assert_eq!(symbols(&policy.select(&tickers)), vec!["FAV", "B", "A"]);
    }

    #[test]
    fn test_quote_filter() {
        let tickers = vec![
            ticker("BTCUSDT", 100.0),
            ticker("ETHBTC", 500.0),
            ticker("ETHUSDT", 80.0),
            ticker("BNBEUR", 900.0),
        ];
        let policy = SelectionPolicy::new("USDT", "BTCUSDT", 10);
        assert_eq!(symbols(&policy.select(&tickers)), vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_top_n_limits_and_favorite_not_duplicated() {
        let tickers = vec![
            ticker("BTCUSDT", 300.0),
            ticker("ETHUSDT", 200.0),
            ticker("SOLUSDT", 100.0),
            ticker("XRPUSDT", 50.0),
        ];
        let policy = SelectionPolicy::new("USDT", "SOLUSDT", 3);
        assert_eq!(symbols(&policy.select(&tickers)), vec!["SOLUSDT", "BTCUSDT", "ETHUSDT"]);

        let policy = SelectionPolicy::new("USDT", "BTCUSDT", 2);
        assert_eq!(symbols(&policy.select(&tickers)), vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_missing_favorite_fills_by_volume() {
        let tickers = vec![ticker("ETHUSDT", 1.0), ticker("SOLUSDT", 2.0)];
        let policy = SelectionPolicy::new("USDT", "BTCUSDT", 5);
        assert_eq!(symbols(&policy.select(&tickers)), vec!["SOLUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_volume_ties_keep_provider_order() {
        let tickers = vec![ticker("XUSDT", 5.0), ticker("YUSDT", 5.0), ticker("ZUSDT", 5.0)];
        let policy = SelectionPolicy::new("USDT", "", 3);
        assert_eq!(symbols(&policy.select(&tickers)), vec!["XUSDT", "YUSDT", "ZUSDT"]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let tickers = vec![ticker("ETHBTC", 1.0)];
        let policy = SelectionPolicy::new("USDT", "BTCUSDT", 10);
        assert!(policy.select(&tickers).is_empty());
        assert!(policy.select(&[]).is_empty());
    }

    #[test]
    fn test_zero_top_n() {
        let tickers = vec![ticker("BTCUSDT", 1.0)];
        let policy = SelectionPolicy::new("USDT", "BTCUSDT", 0);
        assert!(policy.select(&tickers).is_empty());
    }

    #[test]
    fn test_group_sizes() {
        let items: Vec<u32> = (0..7).collect();
        let groups = group(&items, GROUP_SIZE);
        let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![5, 2]);
        assert_eq!(groups[1], &[5, 6]);

        let items: Vec<u32> = (0..10).collect();
        assert_eq!(group(&items, GROUP_SIZE).len(), 2);
        assert!(group::<u32>(&[], GROUP_SIZE).is_empty());
    }
}
