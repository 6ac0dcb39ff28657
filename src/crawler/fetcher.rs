//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the configured user agent
//! - GET requests that treat any non-2xx status as fatal

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// One client is built per run and cloned into every task; clones share the
/// same connection pool.
///
/// # Example
///
/// ```no_run
/// use playbill::config::{CrawlerConfig, UserAgentConfig};
/// use playbill::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a document and returns its body text
///
/// Network failures and non-success statuses both become
/// [`HarvestError::Http`]. There are no retries.
pub async fn fetch_document(client: &Client, url: &Url) -> Result<String, HarvestError> {
    let http_error = |source: reqwest::Error| HarvestError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(http_error)?
        .error_for_status()
        .map_err(http_error)?;

    tracing::debug!("GET {} -> {}", url, response.status());

    response.text().await.map_err(http_error)
}
