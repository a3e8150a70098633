//! Crawler coordinator - main crawl orchestration logic
//!
//! This module walks the directory one level at a time:
//! - Loads the resume checkpoint from the store
//! - Fetches country, state and city listing pages
//! - Skips cities that already have output
//! - Fetches and extracts every company of a city, pausing after each one
//! - Hands each finished city batch to the store in a single write
//!
//! Only one request is in flight at any time.

use crate::config::{Config, EmptyCityPolicy};
use crate::crawler::fetcher::{build_http_client, fetch_page, Page};
use crate::crawler::links::{
    extract_business_links, extract_navigation_links, NavigationLink, NavigationSelectors,
};
use crate::crawler::record::{extract_company, CompanyRecord};
use crate::crawler::report::CrawlReport;
use crate::state::CrawlPhase;
use crate::storage::{CompletedCitySet, CsvStore, RecordStore};
use crate::{CrawlError, FetchError};
use reqwest::Client;
use url::Url;

/// What the coordinator does with an error raised while crawling one company
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyErrorPolicy {
    /// Log it and move on to the next company
    Skip,

    /// Stop the whole run
    Abort,
}

impl CompanyErrorPolicy {
    /// Fetch and extraction failures only cost the one company; anything else
    /// (storage, invalid transitions) ends the run.
    pub fn for_error(err: &CrawlError) -> Self {
        match err {
            CrawlError::Fetch(_) | CrawlError::Extract(_) => Self::Skip,
            _ => Self::Abort,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<S: RecordStore = CsvStore> {
    config: Config,
    store: S,
    client: Client,
    selectors: NavigationSelectors,
    phase: CrawlPhase,
    completed: CompletedCitySet,
    report: CrawlReport,
}

impl Coordinator<CsvStore> {
    /// Creates a coordinator writing to the table named in the configuration
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let store = CsvStore::new(
            config.output.table_path(),
            config.output.empty_cities_path(),
        );
        Self::with_store(config, store)
    }
}

impl<S: RecordStore> Coordinator<S> {
    /// Creates a coordinator over an explicit store
    ///
    /// Nothing is read or fetched until `run`.
    pub fn with_store(config: Config, store: S) -> Result<Self, CrawlError> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        let selectors = NavigationSelectors::from_config(&config.selectors)?;

        Ok(Self {
            config,
            store,
            client,
            selectors,
            phase: CrawlPhase::Init,
            completed: CompletedCitySet::new(),
            report: CrawlReport::start(),
        })
    }

    /// Current traversal phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// The store this coordinator writes to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the crawl from the root page to the last city
    ///
    /// Errors while listing countries, states or cities, and any storage error,
    /// abort the run. Cities flushed before the error stay in the table.
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlError> {
        self.phase = CrawlPhase::Init;
        self.report = CrawlReport::start();

        let root = Url::parse(&self.config.crawler.root_url)?;
        tracing::info!("Starting crawl at {}", root);

        self.store.initialize()?;
        self.completed = self.store.load_completed()?;
        tracing::info!(
            "{} cities already completed, they will be skipped",
            self.completed.len()
        );

        self.advance(CrawlPhase::EnumerateCountries)?;
        let countries = self.list_navigation(&root).await?;

        for country in &countries {
            self.crawl_country(country).await?;
        }

        self.advance(CrawlPhase::Done)?;
        self.report.finish();
        self.report.log();

        Ok(self.report.clone())
    }

    async fn crawl_country(&mut self, country: &NavigationLink) -> Result<(), CrawlError> {
        self.advance(CrawlPhase::EnumerateStates)?;
        tracing::info!("Crawling country: {}", country.label);

        let states = self.list_navigation(&country.url).await?;
        self.report.countries += 1;

        for state in &states {
            self.crawl_state(country, state).await?;
        }

        Ok(())
    }

    async fn crawl_state(
        &mut self,
        country: &NavigationLink,
        state: &NavigationLink,
    ) -> Result<(), CrawlError> {
        self.advance(CrawlPhase::EnumerateCities)?;
        tracing::info!("Crawling state: {}, {}", state.label, country.label);

        let cities = self.list_navigation(&state.url).await?;
        self.report.states += 1;

        for city in &cities {
            if self.completed.contains(&city.label) {
                self.advance(CrawlPhase::CitySkipped)?;
                tracing::info!("Skipping already scraped city: {}", city.label);
                self.report.cities_skipped += 1;
                continue;
            }

            self.crawl_city(&country.label, &state.label, city).await?;
        }

        Ok(())
    }

    async fn crawl_city(
        &mut self,
        country: &str,
        state: &str,
        city: &NavigationLink,
    ) -> Result<(), CrawlError> {
        self.advance(CrawlPhase::CrawlCity)?;
        tracing::info!("Crawling city: {}, {}, {}", city.label, state, country);

        self.advance(CrawlPhase::EnumerateCompanies)?;
        let company_urls = {
            let page = self.fetch(&city.url).await?;
            extract_business_links(&page.document, &page.url, &self.selectors)
        };
        self.report.cities_crawled += 1;

        let mut batch = Vec::with_capacity(company_urls.len());
        for company_url in &company_urls {
            self.advance(CrawlPhase::ExtractCompany)?;

            match self.crawl_company(company_url).await {
                Ok(record) => {
                    let record = record.located(country, state, &city.label);
                    tracing::info!(
                        "Extracted data for company: {} in {}, {}, {}",
                        record.company_name,
                        city.label,
                        state,
                        country
                    );
                    self.report.companies_extracted += 1;
                    batch.push(record);
                }
                Err(e) => match CompanyErrorPolicy::for_error(&e) {
                    CompanyErrorPolicy::Skip => {
                        tracing::error!(
                            "Error extracting company data from {}: {}",
                            company_url,
                            e
                        );
                        self.report.companies_failed += 1;
                    }
                    CompanyErrorPolicy::Abort => return Err(e),
                },
            }

            self.pause_after_company().await;
        }

        if batch.is_empty() {
            return self.finish_empty_city(country, state, &city.label);
        }

        self.flush_city(&city.label, &batch)
    }

    /// Waits the configured delay; only company fetches are paced
    async fn pause_after_company(&mut self) {
        tokio::time::sleep(self.config.crawler.request_delay()).await;
        self.report.pauses += 1;
    }

    /// Fetches one company page and extracts its record
    async fn crawl_company(&self, url: &Url) -> Result<CompanyRecord, CrawlError> {
        let page = self.fetch(url).await?;
        Ok(extract_company(&page.document)?)
    }

    fn flush_city(&mut self, city: &str, batch: &[CompanyRecord]) -> Result<(), CrawlError> {
        self.advance(CrawlPhase::FlushCity)?;

        self.store.append(batch)?;
        self.completed.insert(city.to_string());

        self.report.cities_flushed += 1;
        self.report.rows_written += batch.len() as u64;
        Ok(())
    }

    fn finish_empty_city(
        &mut self,
        country: &str,
        state: &str,
        city: &str,
    ) -> Result<(), CrawlError> {
        self.report.empty_cities += 1;

        match self.config.crawler.empty_city_policy {
            EmptyCityPolicy::Retry => {
                tracing::warn!("No records for city {}, it will be crawled again next run", city);
            }
            EmptyCityPolicy::MarkComplete => {
                self.store.mark_empty_city(country, state, city)?;
                self.completed.insert(city.to_string());
            }
        }

        Ok(())
    }

    /// Fetches a listing page and returns its navigation links
    async fn list_navigation(&self, url: &Url) -> Result<Vec<NavigationLink>, CrawlError> {
        let page = self.fetch(url).await?;
        Ok(extract_navigation_links(
            &page.document,
            &page.url,
            &self.selectors,
        ))
    }

    /// Fetches a page, retrying transient failures up to `max-retries` times
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        let max_retries = self.config.crawler.max_retries;
        let mut attempt = 0;

        loop {
            let err = match fetch_page(&self.client, url).await {
                Ok(page) => return Ok(page),
                Err(e) => e,
            };

            if !err.is_transient() || attempt >= max_retries {
                return Err(err);
            }

            attempt += 1;
            tracing::warn!(
                "Fetch failed ({}), retry {}/{} after {:?}",
                err,
                attempt,
                max_retries,
                self.config.crawler.retry_delay()
            );
            tokio::time::sleep(self.config.crawler.retry_delay()).await;
        }
    }

    fn advance(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!(
            city_work = next.is_city_work(),
            "Crawl phase {} -> {}",
            self.phase,
            next
        );
        if next.is_terminal() {
            tracing::debug!("Directory traversal complete");
        }
        self.phase = next;
        Ok(())
    }
}
