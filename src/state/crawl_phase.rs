/// Crawl phase definitions for the directory traversal
///
/// The coordinator moves through these phases as it walks countries, states,
/// cities and companies. Every move is checked against `can_transition_to`.
use std::fmt;

/// Represents what the coordinator is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Coordinator built, nothing fetched yet
    Init,

    // ===== Directory Levels =====
    /// Fetching the root page and listing countries
    EnumerateCountries,

    /// Fetching a country page and listing its states
    EnumerateStates,

    /// Fetching a state page and listing its cities
    EnumerateCities,

    // ===== City Work =====
    /// City already present in the resume checkpoint
    CitySkipped,

    /// City selected for crawling
    CrawlCity,

    /// Fetching a city page and listing its companies
    EnumerateCompanies,

    /// Fetching and extracting one company page
    ExtractCompany,

    /// Writing the city batch to the table
    FlushCity,

    // ===== Terminal =====
    /// Last city of the last state of the last country handled
    Done,
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true while the coordinator is inside a single city
    pub fn is_city_work(&self) -> bool {
        matches!(
            self,
            Self::CrawlCity | Self::EnumerateCompanies | Self::ExtractCompany | Self::FlushCity
        )
    }

    /// Returns true if the coordinator may move from this phase to `next`
    ///
    /// Once a city is finished (skipped, flushed, or left without records) the
    /// next step is another city of the same state, the next state, the next
    /// country, or the end of the run.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        let next_city = matches!(
            next,
            CitySkipped | CrawlCity | EnumerateCities | EnumerateStates | Done
        );

        match self {
            Init => next == EnumerateCountries,
            EnumerateCountries => matches!(next, EnumerateStates | Done),
            EnumerateStates => matches!(next, EnumerateCities | EnumerateStates | Done),
            EnumerateCities | CitySkipped | FlushCity => next_city,
            CrawlCity => next == EnumerateCompanies,
            EnumerateCompanies => next == ExtractCompany || next_city,
            ExtractCompany => matches!(next, ExtractCompany | FlushCity) || next_city,
            Done => false,
        }
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::EnumerateCountries => "enumerate_countries",
            Self::EnumerateStates => "enumerate_states",
            Self::EnumerateCities => "enumerate_cities",
            Self::CitySkipped => "city_skipped",
            Self::CrawlCity => "crawl_city",
            Self::EnumerateCompanies => "enumerate_companies",
            Self::ExtractCompany => "extract_company",
            Self::FlushCity => "flush_city",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
