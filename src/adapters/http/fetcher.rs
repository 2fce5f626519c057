//! JSON Fetch Client
//!
//! Thin GET + decode wrapper over `reqwest`. No retries: the caller decides
//! whether a failed request aborts the run or only drops one pair.

use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::ports::market_data::FetchError;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "alpha-watch";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    config: HttpConfig,
    http: Client,
}

impl HttpFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a fetcher with custom configuration
    pub fn with_config(config: HttpConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// GET `url` and decode the body as JSON
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::trace!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        decode_json(url, &body)
    }

    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }
}

/// Decode a response body, tagging failures with the request URL
pub fn decode_json<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Build `base?k=v&...` with proper percent-encoding
pub fn build_url(base: &str, params: &[(&str, &str)]) -> Result<String, FetchError> {
    Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| FetchError::InvalidUrl {
            url: base.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_http_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.user_agent, "alpha-watch");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_fetcher_creation() {
        let fetcher = HttpFetcher::new();
        assert!(fetcher.is_ok());
        assert_eq!(fetcher.unwrap().user_agent(), "alpha-watch");
    }

    #[test]
    fn test_decode_json_ok() {
        let value: Value = decode_json("https://x", br#"{"data": [1, 2]}"#).unwrap();
        assert_eq!(value["data"][1], 2);
    }

    #[test]
    fn test_decode_json_error_carries_url() {
        let err = decode_json::<Value>("https://x/ticker", b"<html>").unwrap_err();
        match err {
            FetchError::Decode { url, .. } => assert_eq!(url, "https://x/ticker"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url("https://example.com/klines", &[("symbol", "A B&C"), ("limit", "1")]).unwrap();
        assert_eq!(url, "https://example.com/klines?symbol=A+B%26C&limit=1");
    }

    #[test]
    fn test_build_url_rejects_relative() {
        assert!(matches!(
            build_url("not a url", &[]),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let fetcher = HttpFetcher::with_config(HttpConfig {
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let result = fetcher.fetch_json::<Value>("http://127.0.0.1:9/unreachable").await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
