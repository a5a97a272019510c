//! Field-to-column mapping
//!
//! `Selections` holds what the user picked. `build_mapping` turns selections into
//! a `Mapping` with exactly one entry per schema field, in schema order. An
//! incomplete mapping is a legal intermediate state; nothing is validated here.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::MapError;
use crate::schema::FieldSpec;

/// Sentinel shown to the user for "no source column"
pub const UNMAPPED: &str = "-- unmapped --";

/// The source chosen for one schema field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Choice {
    Column(String),
    Unmapped,
}

impl Choice {
    /// Interpret user input; the sentinel text and blank input mean unmapped
    ///
    /// Column names are kept verbatim, since source headers may carry whitespace.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == UNMAPPED {
            Self::Unmapped
        } else {
            Self::Column(value.to_string())
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Column(c) => Some(c),
            Self::Unmapped => None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped)
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Column(c) => write!(f, "{}", c),
            Self::Unmapped => write!(f, "{}", UNMAPPED),
        }
    }
}

/// The user's raw selections, keyed by target field
///
/// Serialized as a flat `field: column` map; `null` means unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selections(BTreeMap<String, Option<String>>);

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `field=column` pairs as given on the command line
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, MapError> {
        let mut selections = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (field, column) = pair
                .split_once('=')
                .ok_or_else(|| MapError::InvalidSelection(pair.to_string()))?;
            selections.set(field.trim(), Choice::parse(column));
        }
        Ok(selections)
    }

    /// Load selections from a YAML or JSON mapping file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let file_load = |reason: String| MapError::FileLoad {
            name: path.display().to_string(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| file_load(e.to_string()))?;
        let raw: BTreeMap<String, Option<String>> =
            serde_yaml::from_str(&content).map_err(|e| file_load(e.to_string()))?;

        let mut selections = Self::new();
        for (field, column) in raw {
            let choice = column.as_deref().map(Choice::parse).unwrap_or(Choice::Unmapped);
            selections.set(&field, choice);
        }
        debug!("Loaded {} selections from {}", selections.len(), path.display());
        Ok(selections)
    }

    /// Save selections as a YAML mapping file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        let content = serde_yaml::to_string(self).map_err(|e| MapError::Write(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn set(&mut self, field: &str, choice: Choice) {
        let column = choice.column().map(String::from);
        self.0.insert(field.to_string(), column);
    }

    pub fn get(&self, field: &str) -> Choice {
        match self.0.get(field) {
            Some(Some(column)) => Choice::Column(column.clone()),
            _ => Choice::Unmapped,
        }
    }

    /// Overlay another set of selections; its entries win
    pub fn merge(&mut self, other: Selections) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check every selection against the schema fields and the source columns
    pub fn check(&self, fields: &[FieldSpec], source_columns: &[String]) -> Result<(), MapError> {
        for (field, column) in &self.0 {
            if !fields.iter().any(|f| &f.target_field == field) {
                return Err(MapError::UnknownField(field.clone()));
            }
            if let Some(column) = column
                && !source_columns.contains(column)
            {
                return Err(MapError::UnknownColumn(column.clone()));
            }
        }
        Ok(())
    }
}

/// One resolved mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub target_field: String,
    pub choice: Choice,
}

/// Resolved mapping: one entry per schema field, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
}

impl Mapping {
    pub fn get(&self, target_field: &str) -> Option<&Choice> {
        self.entries
            .iter()
            .find(|e| e.target_field == target_field)
            .map(|e| &e.choice)
    }

    /// Whether a field resolves to a real column; fields missing from the mapping count as unmapped
    pub fn is_mapped(&self, target_field: &str) -> bool {
        self.get(target_field).map(|c| !c.is_unmapped()).unwrap_or(false)
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn mapped_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.choice.is_unmapped()).count()
    }

    /// Selections that reproduce this mapping
    pub fn to_selections(&self) -> Selections {
        let mut selections = Selections::new();
        for entry in &self.entries {
            selections.set(&entry.target_field, entry.choice.clone());
        }
        selections
    }
}

/// Resolve selections against the schema fields and the available source columns
///
/// Several fields may share a source column. A selection naming a column that is
/// not among `source_columns` resolves to unmapped.
pub fn build_mapping(fields: &[FieldSpec], source_columns: &[String], selections: &Selections) -> Mapping {
    let entries = fields
        .iter()
        .map(|field| {
            let choice = match selections.get(&field.target_field) {
                Choice::Column(column) if !source_columns.contains(&column) => {
                    warn!("Column '{}' for field '{}' not in source table", column, field.target_field);
                    Choice::Unmapped
                }
                choice => choice,
            };
            MappingEntry {
                target_field: field.target_field.clone(),
                choice,
            }
        })
        .collect();

    for field in selections.0.keys() {
        if !fields.iter().any(|f| &f.target_field == field) {
            warn!("Ignoring selection for unknown field '{}'", field);
        }
    }

    Mapping { entries }
}
