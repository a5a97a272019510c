//! Session state
//!
//! A session is an immutable record. Every user action is an `Event`, and
//! `Session::apply` returns a new record with the mapping and validation fully
//! recomputed from the latest schema, table and selections. Nothing is patched
//! in place.

use log::debug;
use std::sync::Arc;

use crate::error::MapError;
use crate::export::{OutputTable, export};
use crate::mapping::{Choice, Mapping, Selections, build_mapping};
use crate::schema::{FieldSpec, Schema};
use crate::table::SourceTable;
use crate::validate::{ValidationResult, validate};

/// A schema together with the name it was selected by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSchema {
    pub name: String,
    pub schema: Schema,
}

/// A discrete user action
#[derive(Debug, Clone)]
pub enum Event {
    /// A different schema was chosen; clears all selections
    SchemaSelected { name: String, schema: Schema },
    /// A different file was uploaded; clears all selections
    FileUploaded(SourceTable),
    ColumnSelected { field: String, column: String },
    FieldCleared { field: String },
    /// Replace every selection at once, e.g. from a mapping file
    SelectionsReplaced(Selections),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    schema: Option<Arc<SelectedSchema>>,
    table: Option<Arc<SourceTable>>,
    selections: Selections,
    mapping: Mapping,
    validation: ValidationResult,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event, producing the next session state
    pub fn apply(&self, event: Event) -> Result<Session, MapError> {
        let mut schema = self.schema.clone();
        let mut table = self.table.clone();
        let mut selections = self.selections.clone();

        match event {
            Event::SchemaSelected { name, schema: s } => {
                debug!("Schema selected: {}", name);
                schema = Some(Arc::new(SelectedSchema { name, schema: s }));
                selections = Selections::new();
            }
            Event::FileUploaded(t) => {
                debug!("File uploaded: {}", t.name());
                table = Some(Arc::new(t));
                selections = Selections::new();
            }
            Event::ColumnSelected { field, column } => {
                self.require_field(&field)?;
                let choice = Choice::parse(&column);
                if let Choice::Column(c) = &choice
                    && !self.require_table()?.has_column(c)
                {
                    return Err(MapError::UnknownColumn(c.clone()));
                }
                selections.set(&field, choice);
            }
            Event::FieldCleared { field } => {
                self.require_field(&field)?;
                selections.set(&field, Choice::Unmapped);
            }
            Event::SelectionsReplaced(replacement) => {
                let fields = &self.require_schema()?.schema.fields;
                replacement.check(fields, self.require_table()?.columns())?;
                selections = replacement;
            }
        }

        Ok(Self::derive(schema, table, selections))
    }

    fn derive(schema: Option<Arc<SelectedSchema>>, table: Option<Arc<SourceTable>>, selections: Selections) -> Self {
        let fields: &[FieldSpec] = schema.as_ref().map(|s| s.schema.fields.as_slice()).unwrap_or(&[]);
        let columns: &[String] = table.as_ref().map(|t| t.columns()).unwrap_or(&[]);

        let mapping = build_mapping(fields, columns, &selections);
        let validation = validate(fields, &mapping);

        Self {
            schema,
            table,
            selections,
            mapping,
            validation,
        }
    }

    fn require_schema(&self) -> Result<&SelectedSchema, MapError> {
        self.schema.as_deref().ok_or(MapError::NothingSelected("schema"))
    }

    fn require_table(&self) -> Result<&SourceTable, MapError> {
        self.table.as_deref().ok_or(MapError::NothingSelected("file"))
    }

    fn require_field(&self, field: &str) -> Result<&FieldSpec, MapError> {
        self.require_schema()?
            .schema
            .field(field)
            .ok_or_else(|| MapError::UnknownField(field.to_string()))
    }

    pub fn schema(&self) -> Option<&SelectedSchema> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> Option<&SourceTable> {
        self.table.as_deref()
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Export is only offered once a schema and a file are present and the mapping is valid
    pub fn can_export(&self) -> bool {
        self.schema.is_some() && self.table.is_some() && self.validation.is_valid()
    }

    pub fn export(&self) -> Result<OutputTable, MapError> {
        let schema = self.require_schema()?;
        let table = self.require_table()?;
        if !self.validation.is_valid() {
            return Err(MapError::ExportPrecondition {
                missing: self.validation.error_fields(),
            });
        }
        export(&schema.schema.fields, &self.mapping, table)
    }
}
