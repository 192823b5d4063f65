//! HTTP fetcher implementation
//!
//! All requests made by the harvester go through `fetch_text`, one at a time.
//! Non-success status codes are treated as failures so that error pages never
//! reach the HTML or XML parsers.

use crate::config::Config;
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// No timeout is set unless `request-timeout-secs` is configured; a hung
/// upstream then blocks the run.
///
/// # Example
///
/// ```no_run
/// use rating_harvester::config::Config;
/// use rating_harvester::harvest::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.header_value())
        .gzip(true)
        .brotli(true);

    if let Some(secs) = config.fetcher.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Issues a GET request and returns the response body as text
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Connection, DNS, TLS, timeout | `FetchError::Http` |
/// | Non-2xx status | `FetchError::Status` |
/// | Body cannot be read or decoded | `FetchError::Body` |
pub async fn fetch_text(client: &Client, url: &Url) -> Result<String, FetchError> {
    tracing::info!("Fetching {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })?;

    tracing::debug!("Fetched {} ({} bytes, status {})", url, body.len(), status);
    Ok(body)
}
