//! Table layouts
//!
//! Column order is fixed when a table is created and checked every time it is
//! read or appended to.

use crate::storage::traits::{StoreError, StoreResult};
use csv::StringRecord;
use std::path::Path;

/// Columns of the company table, in `CompanyRecord` field order
pub const COLUMNS: [&str; 10] = [
    "country",
    "state",
    "city",
    "company_name",
    "type_of_business",
    "social_media_links",
    "address",
    "phone",
    "website",
    "google_reviews",
];

/// Columns of the empty-cities sidecar
pub const EMPTY_CITY_COLUMNS: [&str; 3] = ["country", "state", "city"];

/// Column holding the resume key in both layouts
pub const CITY_COLUMN: &str = "city";

/// Checks that a table header matches the expected layout exactly
pub fn check_header(path: &Path, found: &StringRecord, expected: &[&str]) -> StoreResult<()> {
    if found.iter().eq(expected.iter().copied()) {
        return Ok(());
    }

    Err(StoreError::SchemaMismatch {
        path: path.to_path_buf(),
        found: found.iter().map(str::to_string).collect(),
    })
}

/// Index of the city column in a layout
pub fn city_index(columns: &[&str]) -> Option<usize> {
    columns.iter().position(|c| *c == CITY_COLUMN)
}
