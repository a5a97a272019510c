//! Source table loading
//!
//! A source table is a delimited text file with a header row, read fully into
//! memory and never modified afterwards.

use csv::ReaderBuilder;
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::MapError;

/// An uploaded tabular dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    size_bytes: u64,
}

impl SourceTable {
    /// Build a table directly from columns and rows
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, MapError> {
        let name = name.into();
        check_columns(&name, &columns)?;
        if let Some(pos) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(MapError::FileLoad {
                name,
                reason: format!("row {} has {} values, expected {}", pos + 1, rows[pos].len(), columns.len()),
            });
        }
        let size_bytes = rows.iter().flatten().chain(columns.iter()).map(|v| v.len() as u64).sum();
        Ok(Self {
            name,
            columns,
            rows,
            size_bytes,
        })
    }

    /// Load a table from a file on disk
    pub fn load(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, MapError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let file = fs::File::open(path).map_err(|e| MapError::FileLoad {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let size_bytes = file.metadata().map(|m| m.len()).unwrap_or(0);

        let mut table = Self::from_reader(name, file, delimiter)?;
        table.size_bytes = size_bytes;
        Ok(table)
    }

    /// Read a table from any reader; the whole input is consumed
    pub fn from_reader(name: impl Into<String>, reader: impl Read, delimiter: u8) -> Result<Self, MapError> {
        let name = name.into();
        let load_err = |e: csv::Error| MapError::FileLoad {
            name: name.clone(),
            reason: e.to_string(),
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(false)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers().map_err(load_err)?.iter().map(String::from).collect();
        check_columns(&name, &columns)?;

        let mut rows = Vec::new();
        let mut size_bytes = 0u64;
        for record in rdr.records() {
            let record = record.map_err(load_err)?;
            size_bytes += record.as_slice().len() as u64;
            rows.push(record.iter().map(String::from).collect());
        }

        debug!("Loaded table {}: {} rows x {} columns", name, rows.len(), columns.len());
        Ok(Self {
            name,
            columns,
            rows,
            size_bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Row-aligned values of one column
    pub fn column(&self, column: &str) -> Option<impl Iterator<Item = &str>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// The first `n` rows
    pub fn preview(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }
}

fn check_columns(name: &str, columns: &[String]) -> Result<(), MapError> {
    if columns.is_empty() {
        return Err(MapError::FileLoad {
            name: name.to_string(),
            reason: "missing header row".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for column in columns {
        if column.trim().is_empty() {
            return Err(MapError::FileLoad {
                name: name.to_string(),
                reason: "empty column name in header".to_string(),
            });
        }
        if !seen.insert(column.as_str()) {
            return Err(MapError::FileLoad {
                name: name.to_string(),
                reason: format!("duplicate column '{}'", column),
            });
        }
    }
    Ok(())
}
