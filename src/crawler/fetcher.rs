//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Issuing exactly one GET per call and parsing the body as HTML
//! - Classifying failures into `FetchError`
//!
//! Retrying is left to the coordinator.

use crate::config::UserAgentConfig;
use crate::FetchError;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use url::Url;

/// A fetched and parsed page
pub struct Page {
    /// Final URL after redirects, used as the base for relative links
    pub url: Url,

    /// Parsed document
    pub document: Html,
}

impl Page {
    /// Parses an HTML body fetched from `url`
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(body),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use award_crawler::config::UserAgentConfig;
/// use award_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and parses the response body
///
/// Any non-2xx status is returned as `FetchError::Status`; connection, timeout and
/// body-read failures as `FetchError::Network`.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<Page, FetchError> {
    tracing::info!("Fetching URL: {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| FetchError::Network {
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

    let final_url = response.url().clone();
    if final_url != *url {
        tracing::debug!("{} redirected to {}", url, final_url);
    }

    let body = response.text().await.map_err(|source| FetchError::Network {
        url: url.to_string(),
        source,
    })?;

    Ok(Page::parse(final_url, &body))
}
