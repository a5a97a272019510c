//! Error types for schema loading, mapping and export

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while mapping a source table onto a schema
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Schema directory not found: {}", .0.display())]
    SchemaDirectoryMissing(PathBuf),

    #[error("No schema files (*.json) found in {}", .0.display())]
    SchemaNotFound(PathBuf),

    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    #[error("Failed to parse schema {name}: {reason}")]
    SchemaParse { name: String, reason: String },

    #[error("Failed to load file {name}: {reason}")]
    FileLoad { name: String, reason: String },

    #[error("Invalid selection '{0}', expected field=column")]
    InvalidSelection(String),

    #[error("Unknown schema field: {0}")]
    UnknownField(String),

    #[error("Unknown source column: {0}")]
    UnknownColumn(String),

    #[error("Required fields are unmapped: {}", .0.join(", "))]
    MappingIncomplete(Vec<String>),

    #[error("Export not allowed while required fields are unmapped: {}", .missing.join(", "))]
    ExportPrecondition { missing: Vec<String> },

    #[error("No {0} selected")]
    NothingSelected(&'static str),

    #[error("Failed to write output: {0}")]
    Write(String),
}

impl MapError {
    /// Fatal errors halt the stage they occur in; everything else lets the user correct input and retry
    pub fn is_fatal(&self) -> bool {
        matches!(self, MapError::SchemaDirectoryMissing(_) | MapError::SchemaNotFound(_))
    }

    /// Fields named by this error, if any
    pub fn fields(&self) -> &[String] {
        match self {
            MapError::MappingIncomplete(fields) => fields,
            MapError::ExportPrecondition { missing } => missing,
            _ => &[],
        }
    }
}

impl From<csv::Error> for MapError {
    fn from(err: csv::Error) -> Self {
        MapError::Write(err.to_string())
    }
}

impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        MapError::Write(err.to_string())
    }
}
