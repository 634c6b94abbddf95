//! HTTP Client
//!
//! Thin wrapper over a pooled blocking reqwest client:
//! - Shared connection pool (cloning is cheap)
//! - Request/connect timeouts and a fixed user agent
//! - Non-2xx statuses mapped onto `PulseError` codes
//! - Logs name the domain only, never the full URL

use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use crate::error::{ErrorCode, PulseError, PulseResult};
use crate::log_debug;

const USER_AGENT: &str = "CoinPulse/1.0";

/// Pooled HTTP client shared by the market, FX and Telegram clients
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the given request timeout
    pub fn new(timeout: Duration) -> PulseResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PulseError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET with query parameters; non-success statuses are errors
    pub fn get(&self, url: &str, query: &[(&str, String)]) -> PulseResult<Response> {
        log_debug!("http", "GET", domain = extract_domain(url));

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| PulseError::from(e).with_details(extract_domain(url)))?;

        check_status(url, response)
    }

    /// POST an url-encoded form; non-success statuses are errors
    pub fn post_form(&self, url: &str, form: &[(&str, String)]) -> PulseResult<Response> {
        log_debug!("http", "POST", domain = extract_domain(url));

        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .map_err(|e| PulseError::from(e).with_details(extract_domain(url)))?;

        check_status(url, response)
    }

    /// POST a multipart form (file uploads)
    pub fn post_multipart(&self, url: &str, form: Form) -> PulseResult<Response> {
        log_debug!("http", "POST multipart", domain = extract_domain(url));

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .map_err(|e| PulseError::from(e).with_details(extract_domain(url)))?;

        check_status(url, response)
    }
}

fn check_status(url: &str, response: Response) -> PulseResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status_to_code(status);
    Err(PulseError::new(code, format!("HTTP {}", status.as_u16())).with_details(extract_domain(url)))
}

fn status_to_code(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::IM_A_TEAPOT => ErrorCode::RateLimited,
        s if s.is_server_error() => ErrorCode::ProviderUnavailable,
        _ => ErrorCode::NetworkError,
    }
}

/// Host (and explicit port) of `url` for logging; never the path or query
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => "unknown".to_string(),
        },
        Err(_) => "invalid-url".to_string(),
    }
}
