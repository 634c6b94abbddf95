//! Message rendering for price blocks

use chrono::{DateTime, FixedOffset};

use crate::cache::{SymbolReport, Window};

/// Placeholder for any value that could not be computed
pub const NO_DATA: &str = "—";

const RANK_EMOJIS: [&str; 10] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟"];

const SEPARATOR: &str = "----------------------------------------------";

/// Signed percent with 2 decimals, or the no-data placeholder
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v),
        None => NO_DATA.to_string(),
    }
}

/// Price in the quote currency. Precision grows as the price shrinks.
pub fn format_price(price: f64) -> String {
    if price >= 1000.0 {
        let fixed = format!("{:.2}", price);
        let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        format!("{}.{}", group_thousands(whole), frac)
    } else if price >= 1.0 {
        format!("{:.4}", price)
    } else {
        let fixed = format!("{:.8}", price);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Direction marker for a change
pub fn arrow(value: Option<f64>) -> &'static str {
    match value {
        None => "➖",
        Some(v) if v > 0.0 => "🟢⬆️",
        Some(_) => "🔴⬇️",
    }
}

/// Keycap emoji for ranks 1-10, `"{n}."` beyond
pub fn rank_emoji(rank: usize) -> String {
    match rank {
        1..=10 => RANK_EMOJIS[rank - 1].to_string(),
        _ => format!("{}.", rank),
    }
}

/// `BTCUSDT` -> `BTC/USDT` when `symbol` ends with `quote`
pub fn human_symbol(symbol: &str, quote: &str) -> String {
    match symbol.strip_suffix(quote) {
        Some(base) if !quote.is_empty() && !base.is_empty() => format!("{}/{}", base, quote),
        _ => symbol.to_string(),
    }
}

/// Whole units of the local currency, space-grouped; the placeholder without a rate
pub fn format_local_amount(price: f64, rate: Option<f64>) -> String {
    match rate {
        Some(rate) if rate > 0.0 && (price * rate).is_finite() => {
            let amount = (price * rate).floor() as u64;
            group_thousands(&amount.to_string())
        }
        _ => NO_DATA.to_string(),
    }
}

/// Insert a space every three digits from the right
fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    format!("{}{}", sign, out)
}

/// Context shared by every block of one cycle
#[derive(Debug, Clone)]
pub struct BlockContext<'a> {
    /// Quote currency used to split pair names
    pub quote: &'a str,
    /// Local currency code shown next to the converted price
    pub local_currency: &'a str,
    /// Local currency units per 1 USD, if known this cycle
    pub rate: Option<f64>,
    /// Update time in the display timezone
    pub updated_at: DateTime<FixedOffset>,
}

/// One block message: header, then one entry per report.
/// `block_index` is 1-based; ranks start at `start_rank`.
pub fn build_block(
    reports: &[SymbolReport],
    block_index: usize,
    total_blocks: usize,
    start_rank: usize,
    ctx: &BlockContext<'_>,
) -> String {
    let mut lines = Vec::with_capacity(reports.len() + 1);

    lines.push(format!(
        "📊 *TOP CRYPTO (Binance)*\n_Updated:_ {}\nBlock *{}* of *{}*\n",
        ctx.updated_at.format("%Y-%m-%d %H:%M UTC%:z"),
        block_index,
        total_blocks,
    ));

    for (offset, report) in reports.iter().enumerate() {
        lines.push(format_entry(report, start_rank + offset, ctx));
    }

    lines.join("\n")
}

fn format_entry(report: &SymbolReport, rank: usize, ctx: &BlockContext<'_>) -> String {
    let moves: Vec<String> = Window::ALL
        .iter()
        .map(|&window| {
            let value = report.change(window);
            format!("{} {}: {}", arrow(value), window, format_percent(value))
        })
        .collect();

    format!(
        "{} *{}*\n💵 Price (USD): `{} $`\n💱 Price ({}): `{}`\n📊 Moves:\n{}   {}\n{}   {}\n{}",
        rank_emoji(rank),
        human_symbol(&report.symbol, ctx.quote),
        format_price(report.current_price),
        ctx.local_currency,
        format_local_amount(report.current_price, ctx.rate),
        moves[0],
        moves[1],
        moves[2],
        moves[3],
        SEPARATOR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(symbol: &str, price: f64) -> SymbolReport {
        SymbolReport {
            symbol: symbol.to_string(),
            current_price: price,
            change_1m: None,
            change_1h: Some(1.234),
            change_24h: Some(-0.5),
            change_7d: Some(0.0),
        }
    }

    fn ctx(rate: Option<f64>) -> BlockContext<'static> {
        let tz = FixedOffset::east_opt(4 * 3600).unwrap();
        BlockContext {
            quote: "USDT",
            local_currency: "AMD",
            rate,
            updated_at: tz.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(None), "—");
        assert_eq!(format_percent(Some(10.0)), "+10.00%");
        assert_eq!(format_percent(Some(-0.456)), "-0.46%");
        assert_eq!(format_percent(Some(0.0)), "+0.00%");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(43250.1), "43 250.10");
        assert_eq!(format_price(1234567.891), "1 234 567.89");
        assert_eq!(format_price(1000.0), "1 000.00");
        assert_eq!(format_price(2.5), "2.5000");
        assert_eq!(format_price(0.00012300), "0.000123");
        assert_eq!(format_price(0.0), "0");
    }

    #[test]
    fn test_arrow() {
        assert_eq!(arrow(None), "➖");
        assert_eq!(arrow(Some(0.1)), "🟢⬆️");
        assert_eq!(arrow(Some(0.0)), "🔴⬇️");
        assert_eq!(arrow(Some(-3.0)), "🔴⬇️");
    }

    #[test]
    fn test_rank_emoji() {
        assert_eq!(rank_emoji(1), "1️⃣");
        assert_eq!(rank_emoji(10), "🔟");
        assert_eq!(rank_emoji(11), "11.");
        assert_eq!(rank_emoji(0), "0.");
    }

    #[test]
    fn test_human_symbol() {
        assert_eq!(human_symbol("BTCUSDT", "USDT"), "BTC/USDT");
        assert_eq!(human_symbol("ETHBTC", "USDT"), "ETHBTC");
        assert_eq!(human_symbol("USDT", "USDT"), "USDT");
        assert_eq!(human_symbol("BTCUSDT", ""), "BTCUSDT");
    }

    #[test]
    fn test_format_local_amount() {
        assert_eq!(format_local_amount(43250.1, Some(387.5)), "16 759 413");
        assert_eq!(format_local_amount(0.5, Some(3.0)), "1");
        assert_eq!(format_local_amount(10.0, None), "—");
        assert_eq!(format_local_amount(10.0, Some(0.0)), "—");
    }

    #[test]
    fn test_build_block() {
        let reports = vec![report("BTCUSDT", 43250.1), report("ETHUSDT", 2300.0)];
        let text = build_block(&reports, 2, 2, 6, &ctx(Some(400.0)));

        assert!(text.starts_with("📊 *TOP CRYPTO (Binance)*"));
        assert!(text.contains("2024-03-01 15:30 UTC+04:00"));
        assert!(text.contains("Block *2* of *2*"));
        assert!(text.contains("6️⃣ *BTC/USDT*"));
        assert!(text.contains("7️⃣ *ETH/USDT*"));
        assert!(text.contains("`43 250.10 $`"));
        assert!(text.contains("`920 000`"));
        assert!(text.contains("➖ 1m: —"));
        assert!(text.contains("🟢⬆️ 1h: +1.23%"));
        assert!(text.contains("🔴⬇️ 24h: -0.50%"));
        assert_eq!(text.matches(SEPARATOR).count(), 2);
    }

    #[test]
    fn test_build_block_without_rate() {
        let text = build_block(&[report("SOLUSDT", 0.5)], 1, 1, 1, &ctx(None));
        assert!(text.contains("💱 Price (AMD): `—`"));
        assert!(text.contains("`0.5 $`"));
    }
}
