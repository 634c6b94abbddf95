//! Window resolver: percent change against the nearest prior sample

use std::fmt;

use super::types::Series;

/// Lookback windows reported for every symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    Minute1,
    Hour1,
    Hour24,
    Day7,
}

impl Window {
    pub const ALL: [Window; 4] = [Window::Minute1, Window::Hour1, Window::Hour24, Window::Day7];

    /// Window length in seconds
    pub fn seconds(&self) -> i64 {
        match self {
            Window::Minute1 => 60,
            Window::Hour1 => 3_600,
            Window::Hour24 => 86_400,
            Window::Day7 => 7 * 86_400,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Window::Minute1 => "1m",
            Window::Hour1 => "1h",
            Window::Hour24 => "24h",
            Window::Day7 => "7d",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Percent change, `None` when the old price is zero
pub fn percentage_change(old: f64, new: f64) -> Option<f64> {
    if old == 0.0 {
        return None;
    }
    Some((new - old) / old * 100.0)
}

/// Percent change of the latest sample against the price `window_seconds` ago.
///
/// The reference is the most recent sample at least `window_seconds` old
/// (`timestamp <= now - window_seconds`). Every window shares the same
/// numerator: the newest sample in the series, whatever its age.
///
/// Returns `None` when the series is empty, when no sample is old enough,
/// or when the reference price is zero.
pub fn percent_change(series: &Series, now: i64, window_seconds: i64) -> Option<f64> {
    let current = series.latest()?;
    let target = now - window_seconds;
    let reference = series.reference_at(target)?;
    percentage_change(reference.price, current.price)
}

/// `percent_change` for a named window
pub fn change_for(series: &Series, now: i64, window: Window) -> Option<f64> {
    percent_change(series, now, window.seconds())
}
