//! Shared HTTP layer for every upstream API.
//!
//! Sources and the geocoder each own an [`HttpClient`] with its own base URL,
//! rate limiter and headers, so one slow upstream never throttles another.

use crate::error::{CiteMapError, Result};
use crate::rate_limit::RateLimiter;
use crate::retry::{with_retry, RetryConfig};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default User-Agent sent upstream. Nominatim requires an identifying one.
pub const DEFAULT_USER_AGENT: &str = concat!("citemap/", env!("CARGO_PKG_VERSION"));

/// Async HTTP client bound to one upstream API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) rate_limiter: RateLimiter,
    pub(crate) retry: RetryConfig,
}

impl HttpClient {
    /// Create a client for the given base URL with a 30 second timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers,
            rate_limiter: RateLimiter::unlimited(),
            retry: RetryConfig::default(),
        })
    }

    /// Override the base URL (useful for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the rate limiter.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = limiter;
        self
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Add (or replace) a header sent with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CiteMapError::Config(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| CiteMapError::Config(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Replace the User-Agent header.
    pub fn with_user_agent(self, user_agent: &str) -> Result<Self> {
        self.with_header("user-agent", user_agent)
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` relative to the base URL and return the body as text.
    pub async fn get_text(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        with_retry(&self.retry, &url, || self.send_get(&url, params)).await
    }

    /// GET `path` and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let body = self.get_text(path, params).await?;
        serde_json::from_str(&body)
            .map_err(|e| CiteMapError::Parse(format!("Invalid JSON from {}: {}", path, e)))
    }

    async fn send_get(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        self.rate_limiter.acquire().await;
        debug!("GET {} {:?}", url, params);

        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .query(params)
            .send()
            .await?;

        let result = handle_response(response).await;
        if let Err(CiteMapError::RateLimited {
            retry_after: Some(wait),
        }) = &result
        {
            self.rate_limiter.back_off(*wait).await;
        }
        result
    }
}

/// Handle the HTTP response, mapping status codes to errors.
async fn handle_response(response: reqwest::Response) -> Result<String> {
    let status = response.status().as_u16();

    match status {
        200..=299 => Ok(response.text().await?),
        404 => Err(CiteMapError::NotFound(response.url().path().to_string())),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(CiteMapError::RateLimited { retry_after })
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(CiteMapError::Api {
                status,
                message: body,
            })
        }
    }
}
