//! JSON Parsing Utilities
//!
//! Exchange APIs send numbers as decimal strings; these helpers accept both.

use crate::error::{PulseError, PulseResult};
use serde::de::DeserializeOwned;

/// Safely parse JSON string into a type
pub fn parse_json<T: DeserializeOwned>(json_str: &str) -> PulseResult<T> {
    serde_json::from_str(json_str)
        .map_err(|e| PulseError::parse_error(format!("JSON parse error: {}", e)))
}

/// Safely extract a string field from JSON object
pub fn get_json_string(value: &serde_json::Value, field: &str) -> Option<String> {
    value.get(field).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Interpret a JSON value as a finite f64 (number or decimal string)
pub fn json_to_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = if let Some(n) = value.as_f64() {
        Some(n)
    } else if let Some(s) = value.as_str() {
        s.trim().parse::<f64>().ok()
    } else {
        None
    };
    parsed.filter(|n| n.is_finite())
}

/// Safely extract an f64 field from JSON object (handles both number and string)
pub fn get_json_f64(value: &serde_json::Value, field: &str) -> Option<f64> {
    value.get(field).and_then(json_to_f64)
}
