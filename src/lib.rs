//! Award-Crawler: a resumable directory crawler
//!
//! This crate walks a four-level award directory (country → state → city → company),
//! extracts one record per company page, and appends the records of each finished city
//! to a CSV table. Cities already present in the table are skipped on later runs.

pub mod config;
pub mod crawler;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for a crawl run
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid crawl transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Errors raised while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Returns true if another attempt at the same URL may succeed
    ///
    /// Network failures, rate limiting and server errors are transient;
    /// every other status is final.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Errors raised while turning a company page into a record
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Malformed company page: {0}")]
    MalformedPage(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CompanyRecord, NavigationLink};
pub use state::CrawlPhase;
pub use storage::{CompletedCitySet, CsvStore, RecordStore};
