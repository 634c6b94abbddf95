//! Telegram Bot API delivery

use reqwest::blocking::multipart::{Form, Part};
use serde_json::json;

use super::{Chart, Notifier};
use crate::error::{PulseError, PulseResult};
use crate::log_debug;
use crate::utils::{get_json_string, parse_json, HttpClient};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Link behind the inline button under every message
pub const EXCHANGE_URL: &str = "https://www.binance.com";

/// Posts Markdown messages and chart photos to one chat
pub struct TelegramNotifier {
    http: HttpClient,
    token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(http: HttpClient, token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            chat_id: chat_id.into(),
            base_url: TELEGRAM_API_BASE.to_string(),
        }
    }

    /// POST /bot{token}/{method}
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Inline keyboard with a single "Open Binance" button
    pub fn reply_markup() -> String {
        json!({
            "inline_keyboard": [[
                { "text": "🌐 Open Binance", "url": EXCHANGE_URL }
            ]]
        })
        .to_string()
    }

    /// Shared fields; `body_key` is `text` for messages, `caption` for photos
    fn form_fields(&self, body_key: &'static str, body: &str) -> Vec<(&'static str, String)> {
        vec![
            ("chat_id", self.chat_id.clone()),
            (body_key, body.to_string()),
            ("parse_mode", "Markdown".to_string()),
            ("reply_markup", Self::reply_markup()),
        ]
    }

    fn message_form(&self, text: &str) -> Vec<(&'static str, String)> {
        self.form_fields("text", text)
    }

    fn photo_form(&self, png: &[u8], caption: &str) -> PulseResult<Form> {
        let photo = Part::bytes(png.to_vec())
            .file_name("chart.png")
            .mime_str("image/png")?;

        Ok(self
            .form_fields("caption", caption)
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
            .part("photo", photo))
    }

    /// Upload a PNG with a Markdown caption via `sendPhoto`
    pub fn send_photo(&self, png: &[u8], caption: &str) -> PulseResult<()> {
        let url = self.method_url("sendPhoto");
        let body = self
            .http
            .post_multipart(&url, self.photo_form(png, caption)?)
            .map_err(|e| PulseError::delivery_failed(e.message).with_details("api.telegram.org"))?
            .text()?;

        Self::check_reply(&body)?;
        log_debug!("telegram", "Photo delivered", bytes = png.len());
        Ok(())
    }

    /// Telegram answers `{"ok": false, "description": ...}` on rejected messages
    fn check_reply(body: &str) -> PulseResult<()> {
        let reply: serde_json::Value = parse_json(body)?;
        if reply.get("ok").and_then(|ok| ok.as_bool()) == Some(true) {
            return Ok(());
        }

        let description = get_json_string(&reply, "description")
            .unwrap_or_else(|| "unknown error".to_string());
        Err(PulseError::delivery_failed(format!("Telegram rejected message: {}", description)))
    }
}

impl Notifier for TelegramNotifier {
    fn send_message(&self, text: &str) -> PulseResult<()> {
        let url = self.method_url("sendMessage");
        let body = self
            .http
            .post_form(&url, &self.message_form(text))
            .map_err(|e| PulseError::delivery_failed(e.message).with_details("api.telegram.org"))?
            .text()?;

        Self::check_reply(&body)?;
        log_debug!("telegram", "Message delivered", chars = text.chars().count());
        Ok(())
    }

    fn send_chart(&self, chart: &Chart) -> PulseResult<()> {
        match &chart.png {
            Some(png) => self.send_photo(png, &chart.caption),
            None => self.send_message(&chart.text),
        }
    }
}
