//! Storage module for persisting company records
//!
//! This module handles all durable state of the crawler:
//! - The CSV table of company records and its fixed column layout
//! - Atomic, append-only writes of finished city batches
//! - The resume checkpoint derived from the table's `city` column

mod csv_store;
mod schema;
mod traits;

pub use csv_store::CsvStore;
pub use schema::{COLUMNS, EMPTY_CITY_COLUMNS};
pub use traits::{RecordStore, StoreError, StoreResult};

use std::collections::HashSet;

/// Cities that already have output and are skipped by the crawl
///
/// Derived from the table at startup; grows in memory as cities are flushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedCitySet {
    cities: HashSet<String>,
}

impl CompletedCitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.contains(city)
    }

    /// Adds a city, returning false if it was already present
    pub fn insert(&mut self, city: String) -> bool {
        self.cities.insert(city)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(String::as_str)
    }
}

impl FromIterator<String> for CompletedCitySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            cities: iter.into_iter().collect(),
        }
    }
}

impl Extend<String> for CompletedCitySet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.cities.extend(iter);
    }
}

impl IntoIterator for CompletedCitySet {
    type Item = String;
    type IntoIter = std::collections::hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.cities.into_iter()
    }
}
