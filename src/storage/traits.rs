//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and
//! associated error types.

use crate::crawler::CompanyRecord;
use crate::storage::CompletedCitySet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read table {}: {source}", .path.display())]
    Read { path: PathBuf, source: csv::Error },

    #[error("Failed to write table {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode rows for {}: {source}", .path.display())]
    Encode { path: PathBuf, source: csv::Error },

    #[error("Unexpected columns in {}: {found:?}", .path.display())]
    SchemaMismatch { path: PathBuf, found: Vec<String> },
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for durable record storage
///
/// The store owns all durable state. The coordinator only hands it finished
/// city batches and reads the resume checkpoint back at startup.
pub trait RecordStore {
    /// Creates the table with its header if it doesn't exist yet
    ///
    /// Safe to call on every start; an existing table is left untouched.
    fn initialize(&mut self) -> StoreResult<()>;

    /// Loads the set of cities that already have output
    fn load_completed(&self) -> StoreResult<CompletedCitySet>;

    /// Appends a city batch after all existing rows
    ///
    /// Column order never changes. Appending the same records twice stores them twice.
    fn append(&mut self, records: &[CompanyRecord]) -> StoreResult<()>;

    /// Records a city that produced no records so later runs skip it
    fn mark_empty_city(&mut self, country: &str, state: &str, city: &str) -> StoreResult<()>;
}
