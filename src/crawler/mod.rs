//! Crawler module for directory traversal and record extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - Navigation and company link extraction
//! - Company record extraction from leaf pages
//! - Overall crawl coordination and per-run counters

mod coordinator;
mod fetcher;
mod links;
mod record;
mod report;

pub use coordinator::{CompanyErrorPolicy, Coordinator};
pub use fetcher::{build_http_client, fetch_page, Page};
pub use links::{
    extract_business_links, extract_navigation_links, NavigationLink, NavigationSelectors,
};
pub use record::{extract_company, CompanyRecord};
pub use report::CrawlReport;

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the output table if it doesn't exist
/// 2. Load the cities that already have output
/// 3. Walk countries, states and cities from the root page
/// 4. Extract every company of each remaining city
/// 5. Append each city's records in a single write
///
/// # Example
///
/// ```no_run
/// use award_crawler::config::Config;
/// use award_crawler::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = crawl(Config::default()).await?;
/// println!("{} rows written", report.rows_written);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
