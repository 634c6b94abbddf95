//! 24h price chart
//!
//! Hourly closes are drawn as a PNG line chart for photo delivery. A Unicode
//! sparkline with high/low/change serves destinations that only take text.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::prelude::*;

use super::format::{format_percent, format_price, human_symbol};
use crate::cache::percentage_change;
use crate::error::{PulseError, PulseResult};
use crate::log_warn;
use crate::market::Kline;

/// Kline interval and count for the 24h chart
pub const CHART_INTERVAL: &str = "1h";
pub const CHART_LIMIT: u32 = 24;

/// PNG size in pixels
pub const CHART_WIDTH: u32 = 900;
pub const CHART_HEIGHT: u32 = 450;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);
const GRID_LINES: usize = 5;

/// Scale prices to 0..=100. A flat series sits at 50.
pub fn normalize(prices: &[f64]) -> Vec<f64> {
    if prices.is_empty() {
        return vec![];
    }

    let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        return vec![50.0; prices.len()];
    }

    prices.iter().map(|&p| ((p - min) / range) * 100.0).collect()
}

/// One bar per price, lowest `▁`, highest `█`
pub fn sparkline(prices: &[f64]) -> String {
    let top = (BARS.len() - 1) as f64;
    normalize(prices)
        .iter()
        .map(|&level| BARS[((level / 100.0) * top).round() as usize])
        .collect()
}

/// Summary of one chart period
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStats {
    pub high: f64,
    pub low: f64,
    pub first_open: f64,
    pub last_close: f64,
}

impl ChartStats {
    pub fn from_klines(klines: &[Kline]) -> Option<Self> {
        let first = klines.first()?;
        let last = klines.last()?;

        Some(Self {
            high: klines.iter().map(|k| k.high).fold(f64::NEG_INFINITY, f64::max),
            low: klines.iter().map(|k| k.low).fold(f64::INFINITY, f64::min),
            first_open: first.open,
            last_close: last.close,
        })
    }

    /// Percent move from the first open to the last close
    pub fn change(&self) -> Option<f64> {
        percentage_change(self.first_open, self.last_close)
    }
}

/// A rendered chart. `png` is `None` when drawing failed; `text` always works.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Markdown caption for the photo
    pub caption: String,
    /// Caption followed by the sparkline summary
    pub text: String,
    pub png: Option<Vec<u8>>,
}

/// Chart for `symbol`; `None` without candles
pub fn render_chart(symbol: &str, quote: &str, klines: &[Kline]) -> Option<Chart> {
    let stats = ChartStats::from_klines(klines)?;
    let closes: Vec<f64> = klines.iter().map(|k| k.close).collect();

    let caption = format!("📈 *{}* · 24h chart", human_symbol(symbol, quote));
    let text = format!(
        "{}\n`{}`\nHigh: `{}`  Low: `{}`  Change: {}",
        caption,
        sparkline(&closes),
        format_price(stats.high),
        format_price(stats.low),
        format_percent(stats.change()),
    );

    let png = match render_png(&closes) {
        Ok(png) => Some(png),
        Err(e) => {
            log_warn!("chart", "PNG render failed", symbol = symbol, error = e);
            None
        }
    };

    Some(Chart { caption, text, png })
}

/// Line chart of `closes` with horizontal grid lines, PNG encoded
pub fn render_png(closes: &[f64]) -> PulseResult<Vec<u8>> {
    let (low, high) = price_bounds(closes).ok_or_else(|| PulseError::render("No prices to plot"))?;
    let x_max = (closes.len().max(2) - 1) as f64;

    let mut pixels = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(24)
            .build_cartesian_2d(0f64..x_max, low..high)
            .map_err(draw_error)?;

        for i in 0..GRID_LINES {
            let y = low + (high - low) * i as f64 / (GRID_LINES - 1) as f64;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, y), (x_max, y)],
                    GRID_COLOR.stroke_width(1),
                )))
                .map_err(draw_error)?;
        }

        chart
            .draw_series(LineSeries::new(
                closes.iter().enumerate().map(|(i, &p)| (i as f64, p)),
                LINE_COLOR.stroke_width(3),
            ))
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&pixels, CHART_WIDTH, CHART_HEIGHT, ColorType::Rgb8)
        .map_err(|e| PulseError::render(format!("PNG encoding failed: {}", e)))?;
    Ok(png)
}

/// Y range with 5% headroom; a flat series gets a 1% band around its price
fn price_bounds(prices: &[f64]) -> Option<(f64, f64)> {
    if prices.is_empty() || prices.iter().any(|p| !p.is_finite()) {
        return None;
    }

    let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let pad = if max > min {
        (max - min) * 0.05
    } else {
        (max.abs() * 0.01).max(1e-8)
    };

    Some((min - pad, max + pad))
}

fn draw_error(e: impl std::fmt::Display) -> PulseError {
    PulseError::render(format!("Chart drawing failed: {}", e))
}
