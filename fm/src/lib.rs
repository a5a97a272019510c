//! Fieldmap - map tabular files onto declarative field schemas
//!
//! A schema lists target fields with a type, a required flag and a description.
//! The user associates each field with a column of an uploaded CSV file, the
//! mapping is validated, and a reshaped CSV conforming to the schema is exported.
//!
//! # Stages
//!
//! - [`schema`] - schema types and the schema directory catalog
//! - [`mapping`] - user selections resolved into a field-to-column mapping
//! - [`validate`] - required fields must be mapped, optional ones only warn
//! - [`export`] - column copy and empty fill into an output table
//!
//! [`session`] ties the stages together as an immutable state record driven by
//! events, which is what the [`repl`] and the CLI use.
//!
//! # Example
//!
//! ```ignore
//! use fieldmap::{SchemaCatalog, Selections, SourceTable, build_mapping, export, validate};
//!
//! let schema = SchemaCatalog::open("schemas")?.load("customers.json")?;
//! let table = SourceTable::load("customers.csv", b',')?;
//! let selections = Selections::from_pairs(&["name=full_name", "id=customer_id"])?;
//! let mapping = build_mapping(&schema.fields, table.columns(), &selections);
//! assert!(validate(&schema.fields, &mapping).is_valid());
//! export(&schema.fields, &mapping, &table)?.save("mapped_customers.csv", b',')?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod mapping;
pub mod render;
pub mod repl;
pub mod schema;
pub mod session;
pub mod table;
pub mod validate;

pub use config::Config;
pub use error::MapError;
pub use export::{DEFAULT_OUTPUT_PREFIX, OutputTable, export, output_file_name};
pub use mapping::{Choice, Mapping, MappingEntry, Selections, UNMAPPED, build_mapping};
pub use schema::{FieldSpec, FieldType, Schema, SchemaCatalog, SchemaEntry};
pub use session::{Event, SelectedSchema, Session};
pub use table::SourceTable;
pub use validate::{ValidationIssue, ValidationResult, validate};
