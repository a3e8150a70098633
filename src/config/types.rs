use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Award-Crawler
///
/// Every section is optional in the TOML file; missing sections and keys fall back to
/// the defaults used for the public award directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Directory root listing the countries
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Pause after every company page fetch (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Extra attempts for a fetch that failed transiently (0 disables retries)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Pause between retry attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// What to do with a city that produced no records
    #[serde(rename = "empty-city-policy")]
    pub empty_city_policy: EmptyCityPolicy,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: "https://www.ccaward.com/award-winners/".to_string(),
            request_delay_ms: 1000,
            max_retries: 0,
            retry_delay_ms: 5000,
            request_timeout_secs: 30,
            empty_city_policy: EmptyCityPolicy::Retry,
        }
    }
}

/// Policy for cities whose listing yields zero successful records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyCityPolicy {
    /// Leave the city out of durable state so the next run crawls it again
    #[default]
    Retry,

    /// Record the city in the empty-cities sidecar so later runs skip it
    MarkComplete,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "AwardCrawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/award-crawler".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV table of company records
    #[serde(rename = "table-path")]
    pub table_path: String,
}

impl OutputConfig {
    pub fn table_path(&self) -> PathBuf {
        PathBuf::from(&self.table_path)
    }

    /// Sidecar listing cities marked complete without any records
    pub fn empty_cities_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.empty-cities", self.table_path))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            table_path: "award_winners.csv".to_string(),
        }
    }
}

/// CSS selectors for the navigation levels of the directory
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Anchors linking to the next level (countries, states, cities)
    #[serde(rename = "navigation-link")]
    pub navigation_link: String,

    /// Element inside a navigation anchor holding its label
    #[serde(rename = "navigation-label")]
    pub navigation_label: String,

    /// Headings wrapping the anchor of each company on a city page
    #[serde(rename = "business-heading")]
    pub business_heading: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            navigation_link: "a.blogs-item-link".to_string(),
            navigation_label: "h3".to_string(),
            business_heading: "h3.winner-heading".to_string(),
        }
    }
}
