//! Output table construction and serialization

use csv::WriterBuilder;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::MapError;
use crate::mapping::Mapping;
use crate::schema::FieldSpec;
use crate::table::SourceTable;
use crate::validate::validate;

/// Default prefix for exported file names
pub const DEFAULT_OUTPUT_PREFIX: &str = "mapped_";

/// A schema-shaped table: one column per field in schema order, one row per source row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Serialize as delimited text with a header row
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<(), MapError> {
        let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self, delimiter: u8) -> Result<String, MapError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf, delimiter)?;
        String::from_utf8(buf).map_err(|e| MapError::Write(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>, delimiter: u8) -> Result<(), MapError> {
        let path = path.as_ref();
        let file = fs::File::create(path)?;
        self.write_csv(file, delimiter)?;
        info!("Wrote {} rows to {}", self.row_count(), path.display());
        Ok(())
    }
}

/// Build the output table for a valid mapping
///
/// Mapped fields copy their source column verbatim. Unmapped optional fields are
/// filled with empty strings. Fails with `ExportPrecondition` if any required field
/// is unmapped.
pub fn export(fields: &[FieldSpec], mapping: &Mapping, table: &SourceTable) -> Result<OutputTable, MapError> {
    let result = validate(fields, mapping);
    if !result.is_valid() {
        return Err(MapError::ExportPrecondition {
            missing: result.error_fields(),
        });
    }

    let sources: Vec<Option<usize>> = fields
        .iter()
        .map(|field| {
            mapping
                .get(&field.target_field)
                .and_then(|c| c.column())
                .and_then(|c| table.column_index(c))
        })
        .collect();

    // mapped columns must exist in this table
    for (field, source) in fields.iter().zip(&sources) {
        if source.is_none()
            && let Some(column) = mapping.get(&field.target_field).and_then(|c| c.column())
        {
            return Err(MapError::UnknownColumn(column.to_string()));
        }
    }

    let columns = fields.iter().map(|f| f.target_field.clone()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            sources
                .iter()
                .map(|source| source.map(|idx| row[idx].clone()).unwrap_or_default())
                .collect()
        })
        .collect();

    debug!("Exported {} rows x {} fields from {}", table.row_count(), fields.len(), table.name());
    Ok(OutputTable { columns, rows })
}

/// Output file name for an input file: the prefix plus the input's file name
pub fn output_file_name(input_name: &str, prefix: &str) -> String {
    let base = Path::new(input_name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| input_name.to_string());
    format!("{}{}", prefix, base)
}
