//! Utilities Module
//!
//! Common utilities used across the crate.

mod cache;
mod http;
mod json;
pub mod logging;

pub use cache::*;
pub use http::*;
pub use json::*;

/// Current Unix time in whole seconds
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
