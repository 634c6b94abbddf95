//! USD exchange rates from open.er-api.com

use crate::error::{PulseError, PulseResult};
use crate::utils::{json_to_f64, parse_json, HttpClient};

pub const FX_API_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// Exchange-rate client (USD base)
#[derive(Clone)]
pub struct FxClient {
    pub url: String,
    http: HttpClient,
}

impl FxClient {
    pub fn new(http: HttpClient) -> Self {
        Self {
            url: FX_API_URL.to_string(),
            http,
        }
    }

    /// Units of `currency` per 1 USD
    pub fn fetch_rate(&self, currency: &str) -> PulseResult<f64> {
        let body = self.http.get(&self.url, &[])?.text()?;
        Self::parse_rate(&body, currency)
    }

    /// Read `rates.<currency>` from the response
    pub fn parse_rate(json: &str, currency: &str) -> PulseResult<f64> {
        let parsed: serde_json::Value = parse_json(json)?;
        let code = currency.to_uppercase();

        parsed
            .get("rates")
            .and_then(|rates| rates.get(&code))
            .and_then(json_to_f64)
            .filter(|rate| *rate > 0.0)
            .ok_or_else(|| PulseError::no_data(format!("No USD rate for {}", code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate() {
        let json = r#"{"result": "success", "base_code": "USD", "rates": {"USD": 1, "AMD": 387.45, "EUR": 0.92}}"#;
        assert_eq!(FxClient::parse_rate(json, "AMD").unwrap(), 387.45);
        assert_eq!(FxClient::parse_rate(json, "eur").unwrap(), 0.92);
    }

    #[test]
    fn test_parse_rate_missing() {
        let json = r#"{"result": "error", "error-type": "unsupported-code"}"#;
        assert!(FxClient::parse_rate(json, "AMD").is_err());

        let json = r#"{"rates": {"AMD": 0}}"#;
        assert!(FxClient::parse_rate(json, "AMD").is_err());
    }
}
