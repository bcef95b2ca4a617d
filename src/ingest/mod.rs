//! CSV ingestion for population and mortality tables.
//!
//! Tables are comma-separated with a header row and double-quote quoting.
//! Population tables carry one column per year, so they are kept as raw
//! records with header lookup; mortality tables are parsed into typed
//! records up front.

use crate::config::MortalityColumns;
use crate::models::{DataError, MortalityRecord};
use anyhow::{Context, Result};
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// A population table held as raw records with header-based column lookup.
///
/// Year columns are dynamic (one per year), so rows are not deserialized
/// into a fixed struct.
#[derive(Debug, Clone)]
pub struct PopulationTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl PopulationTable {
    /// Load a population table from a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = std::fs::File::open(path)
            .with_context(|| format!("Failed to open population table: {}", path.display()))?;
        Self::from_reader(reader)
            .with_context(|| format!("Failed to parse population table: {}", path.display()))
    }

    /// Read a population table from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.iter().map(String::from).collect();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;

        let table = Self { headers, rows };
        debug!("Loaded population table: {} rows", table.rows.len());
        Ok(table)
    }

    /// Index of the column with the given header, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of the column with the given header, or `MissingColumn`.
    pub fn require_column(&self, name: &str) -> Result<usize, DataError> {
        self.column(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Raw data rows, excluding the header.
    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }
}

/// Load a mortality table, resolving the configured column names against
/// the header row.
///
/// Rows whose year or value fail to parse are skipped with a warning;
/// a missing column is an error.
pub fn load_mortality(path: &Path, columns: &MortalityColumns) -> Result<Vec<MortalityRecord>> {
    let reader = std::fs::File::open(path)
        .with_context(|| format!("Failed to open mortality table: {}", path.display()))?;
    mortality_from_reader(reader, columns)
        .with_context(|| format!("Failed to parse mortality table: {}", path.display()))
}

/// Read mortality records from any CSV source.
pub fn mortality_from_reader<R: Read>(
    reader: R,
    columns: &MortalityColumns,
) -> Result<Vec<MortalityRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()).into())
    };

    let time_idx = col(&columns.time)?;
    let territory_idx = col(&columns.territory)?;
    let cause_idx = col(&columns.cause)?;
    let value_idx = col(&columns.value)?;

    let mut records = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        let row = row?;

        let year = match row.get(time_idx).and_then(|v| v.trim().parse::<i32>().ok()) {
            Some(year) => year,
            None => {
                warn!("Skipping mortality row {}: unparsable year", line + 2);
                continue;
            }
        };
        let value = match row.get(value_idx).and_then(|v| v.trim().parse::<f64>().ok()) {
            Some(value) => value,
            None => {
                warn!("Skipping mortality row {}: unparsable value", line + 2);
                continue;
            }
        };

        records.push(MortalityRecord {
            territory: row.get(territory_idx).unwrap_or_default().to_string(),
            cause: row.get(cause_idx).unwrap_or_default().to_string(),
            year,
            value,
        });
    }

    debug!("Loaded mortality table: {} rows", records.len());
    Ok(records)
}
