//! Notification module
//!
//! Provides:
//! - Block message rendering
//! - 24h charts as PNG, with a sparkline text fallback
//! - Telegram delivery (messages and photos)
//! - A logging notifier for dry runs and missing credentials

pub mod format;
pub mod chart;
pub mod telegram;

pub use format::*;
pub use chart::*;
pub use telegram::*;

use crate::error::PulseResult;
use crate::log_info;

/// Destination for rendered messages
pub trait Notifier {
    fn send_message(&self, text: &str) -> PulseResult<()>;

    /// Deliver a chart. Text-only destinations get the sparkline summary.
    fn send_chart(&self, chart: &Chart) -> PulseResult<()> {
        self.send_message(&chart.text)
    }
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_message(&self, text: &str) -> PulseResult<()> {
        log_info!("notify", "Message (not delivered)", chars = text.chars().count());
        println!("{}\n", text);
        Ok(())
    }
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn send_message(&self, text: &str) -> PulseResult<()> {
        (**self).send_message(text)
    }

    fn send_chart(&self, chart: &Chart) -> PulseResult<()> {
        (**self).send_chart(chart)
    }
}
