//! CSV storage implementation
//!
//! Every write goes through a temp file in the table's directory which is then
//! renamed over the table, so a crash leaves either the old or the new table.

use crate::crawler::CompanyRecord;
use crate::storage::schema::{check_header, city_index, COLUMNS, EMPTY_CITY_COLUMNS};
use crate::storage::traits::{RecordStore, StoreError, StoreResult};
use crate::storage::CompletedCitySet;
use csv::{ReaderBuilder, Terminator, Writer, WriterBuilder};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// CSV-backed record store
#[derive(Debug, Clone)]
pub struct CsvStore {
    table_path: PathBuf,
    empty_cities_path: PathBuf,
}

impl CsvStore {
    /// Creates a store over the given table and empty-cities sidecar
    ///
    /// Nothing is touched on disk until `initialize` or a write.
    pub fn new(table_path: impl Into<PathBuf>, empty_cities_path: impl Into<PathBuf>) -> Self {
        Self {
            table_path: table_path.into(),
            empty_cities_path: empty_cities_path.into(),
        }
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    pub fn empty_cities_path(&self) -> &Path {
        &self.empty_cities_path
    }

    /// Reads every record currently in the table
    pub fn read_all(&self) -> StoreResult<Vec<CompanyRecord>> {
        let mut reader = open_reader(&self.table_path, &COLUMNS)?;
        reader
            .deserialize()
            .collect::<Result<Vec<CompanyRecord>, _>>()
            .map_err(|source| StoreError::Read {
                path: self.table_path.clone(),
                source,
            })
    }
}

impl RecordStore for CsvStore {
    fn initialize(&mut self) -> StoreResult<()> {
        if is_missing_or_empty(&self.table_path) {
            tracing::info!(
                "Creating table {} with fixed columns",
                self.table_path.display()
            );
            atomic_append(&self.table_path, &COLUMNS, |_| Ok(()))?;
        }
        Ok(())
    }

    fn load_completed(&self) -> StoreResult<CompletedCitySet> {
        let mut completed = read_cities(&self.table_path, &COLUMNS)?;

        if self.empty_cities_path.exists() {
            let empty = read_cities(&self.empty_cities_path, &EMPTY_CITY_COLUMNS)?;
            tracing::debug!(
                "{} empty cities marked complete in {}",
                empty.len(),
                self.empty_cities_path.display()
            );
            completed.extend(empty);
        }

        Ok(completed)
    }

    fn append(&mut self, records: &[CompanyRecord]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        atomic_append(&self.table_path, &COLUMNS, |writer| {
            for record in records {
                writer.serialize(record)?;
            }
            Ok(())
        })?;

        tracing::info!(
            "Saved {} records to {}",
            records.len(),
            self.table_path.display()
        );
        Ok(())
    }

    fn mark_empty_city(&mut self, country: &str, state: &str, city: &str) -> StoreResult<()> {
        atomic_append(&self.empty_cities_path, &EMPTY_CITY_COLUMNS, |writer| {
            writer.write_record([country, state, city])
        })?;

        tracing::info!(
            "Marked empty city {} complete in {}",
            city,
            self.empty_cities_path.display()
        );
        Ok(())
    }
}

fn is_missing_or_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
}

fn open_reader(path: &Path, columns: &[&str]) -> StoreResult<csv::Reader<File>> {
    let read_err = |source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new().from_path(path).map_err(read_err)?;
    let headers = reader.headers().map_err(read_err)?.clone();
    check_header(path, &headers, columns)?;
    Ok(reader)
}

/// Distinct non-empty values of the city column
fn read_cities(path: &Path, columns: &[&str]) -> StoreResult<CompletedCitySet> {
    let mut reader = open_reader(path, columns)?;
    let index = city_index(columns).ok_or_else(|| StoreError::SchemaMismatch {
        path: path.to_path_buf(),
        found: columns.iter().map(|c| c.to_string()).collect(),
    })?;

    let mut cities = CompletedCitySet::new();
    for row in reader.records() {
        let row = row.map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(city) = row.get(index).filter(|c| !c.is_empty()) {
            cities.insert(city.to_string());
        }
    }

    Ok(cities)
}

/// Copies the table into a temp file, lets `write_rows` add rows after the
/// existing ones, then renames the temp file over the table.
///
/// A missing or empty table gets the header first; an existing one must
/// already carry exactly `columns`.
fn atomic_append<F>(path: &Path, columns: &[&str], write_rows: F) -> StoreResult<()>
where
    F: FnOnce(&mut Writer<&mut File>) -> Result<(), csv::Error>,
{
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let encode_err = |source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let existing = if is_missing_or_empty(path) {
        Vec::new()
    } else {
        drop(open_reader(path, columns)?);
        fs::read(path).map_err(write_err)?
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    {
        let file = temp.as_file_mut();
        file.write_all(&existing).map_err(write_err)?;
        if !existing.is_empty() && !existing.ends_with(b"\n") {
            file.write_all(b"\n").map_err(write_err)?;
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);

        if existing.is_empty() {
            writer.write_record(columns).map_err(encode_err)?;
        }
        write_rows(&mut writer).map_err(encode_err)?;
        writer.flush().map_err(write_err)?;
    }

    // The temp file is created owner-only; keep the table's own mode
    if path.exists() {
        let permissions = fs::metadata(path).map_err(write_err)?.permissions();
        fs::set_permissions(temp.path(), permissions).map_err(write_err)?;
    }

    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
