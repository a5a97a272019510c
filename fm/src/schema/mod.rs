//! Schema types
//!
//! A schema is a contract name plus an ordered list of field specs. Schemas are
//! read from JSON files and are immutable once loaded.

mod catalog;

pub use catalog::{SchemaCatalog, SchemaEntry};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::MapError;

/// Declared type of a schema field
///
/// Types are descriptive only: they are shown to the user but never enforced
/// against the copied data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Date,
    Datetime,
    Enum,
    Boolean,
    Other(String),
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Date => write!(f, "date"),
            Self::Datetime => write!(f, "datetime"),
            Self::Enum => write!(f, "enum"),
            Self::Boolean => write!(f, "boolean"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "date" => Self::Date,
            "datetime" => Self::Datetime,
            "enum" => Self::Enum,
            "boolean" => Self::Boolean,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.to_string()
    }
}

/// One field of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output column name, unique within the schema
    pub target_field: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Allowed values, only meaningful for enum fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn new(target_field: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            target_field: target_field.into(),
            field_type,
            required,
            description: String::new(),
            values: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = Some(values);
        self
    }

    /// Enum values worth displaying; empty unless the field is an enum
    pub fn enum_values(&self) -> &[String] {
        match (&self.field_type, &self.values) {
            (FieldType::Enum, Some(values)) => values,
            _ => &[],
        }
    }
}

/// A target schema: the field set a source table is mapped into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(contract_name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            contract_name: Some(contract_name.into()),
            fields,
        }
    }

    /// Parse a schema from JSON text; `name` is only used in error messages
    pub fn from_json(name: &str, content: &str) -> Result<Self, MapError> {
        let schema: Schema = serde_json::from_str(content).map_err(|e| MapError::SchemaParse {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let mut seen = HashSet::new();
        for field in &schema.fields {
            if !seen.insert(field.target_field.as_str()) {
                return Err(MapError::SchemaParse {
                    name: name.to_string(),
                    reason: format!("duplicate target_field '{}'", field.target_field),
                });
            }
        }

        Ok(schema)
    }

    pub fn display_name(&self) -> &str {
        self.contract_name.as_deref().unwrap_or("unnamed")
    }

    pub fn field(&self, target_field: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.target_field == target_field)
    }

    pub fn required_count(&self) -> usize {
        self.fields.iter().filter(|f| f.required).count()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
