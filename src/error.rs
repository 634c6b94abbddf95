//! Unified error types for coinpulse
//!
//! Every fallible operation outside the cache internals reports through
//! `PulseError` so the cycle runner can log and classify failures in one place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all coinpulse operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl PulseError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn no_data(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoData, msg)
    }

    pub fn delivery_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DeliveryFailed, msg)
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, msg)
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RenderError, msg)
    }

    /// Whether the next cycle may reasonably succeed without intervention
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::NetworkError
                | ErrorCode::RateLimited
                | ErrorCode::Timeout
                | ErrorCode::ProviderUnavailable
        )
    }
}

impl fmt::Display for PulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for PulseError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    ConfigError,

    // Network errors
    NetworkError,
    RateLimited,
    ProviderUnavailable,
    Timeout,

    // Data errors
    ParseError,
    JsonError,
    NoData,

    // Output errors
    DeliveryFailed,
    StorageError,
    RenderError,
}

/// Result type alias for coinpulse operations
pub type PulseResult<T> = Result<T, PulseError>;

// Conversions from common error types

impl From<serde_json::Error> for PulseError {
    fn from(e: serde_json::Error) -> Self {
        PulseError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<std::io::Error> for PulseError {
    fn from(e: std::io::Error) -> Self {
        PulseError::new(ErrorCode::StorageError, e.to_string())
    }
}

impl From<reqwest::Error> for PulseError {
    fn from(e: reqwest::Error) -> Self {
        // The URL may carry a bot token
        let e = e.without_url();
        if e.is_timeout() {
            PulseError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            PulseError::new(ErrorCode::NetworkError, "Connection failed")
        } else if e.is_decode() {
            PulseError::new(ErrorCode::ParseError, e.to_string())
        } else {
            PulseError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<crate::cache::CacheError> for PulseError {
    fn from(e: crate::cache::CacheError) -> Self {
        match e {
            crate::cache::CacheError::InvalidPrice { .. } => {
                PulseError::new(ErrorCode::InvalidInput, e.to_string())
            }
            _ => PulseError::new(ErrorCode::StorageError, e.to_string()),
        }
    }
}
