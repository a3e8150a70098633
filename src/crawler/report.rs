//! Per-run crawl counters
//!
//! The coordinator fills a `CrawlReport` as it goes and logs it when the run ends.

use chrono::{DateTime, Utc};

/// Counters for a single crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Country pages fetched
    pub countries: u64,

    /// State pages fetched
    pub states: u64,

    /// Cities whose listing page was fetched
    pub cities_crawled: u64,

    /// Cities skipped because they were already complete
    pub cities_skipped: u64,

    /// Cities whose batch was written to the table
    pub cities_flushed: u64,

    /// Crawled cities that produced no records
    pub empty_cities: u64,

    pub companies_extracted: u64,
    pub companies_failed: u64,

    /// Pauses taken after company fetches
    pub pauses: u64,

    /// Rows appended to the table during this run
    pub rows_written: u64,
}

impl CrawlReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            countries: 0,
            states: 0,
            cities_crawled: 0,
            cities_skipped: 0,
            cities_flushed: 0,
            empty_cities: 0,
            companies_extracted: 0,
            companies_failed: 0,
            pauses: 0,
            rows_written: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Seconds between start and finish, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Logs the counters at info level
    pub fn log(&self) {
        tracing::info!(
            "Crawl finished: {} countries, {} states, {} cities crawled, {} skipped",
            self.countries,
            self.states,
            self.cities_crawled,
            self.cities_skipped
        );
        tracing::info!(
            "Companies: {} extracted, {} failed; {} cities flushed, {} empty; {} rows written",
            self.companies_extracted,
            self.companies_failed,
            self.cities_flushed,
            self.empty_cities,
            self.rows_written
        );
        tracing::debug!("{} pauses after company fetches", self.pauses);
        if let Some(seconds) = self.duration_seconds() {
            tracing::info!("Elapsed: {}s", seconds);
        }
    }
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self::start()
    }
}
