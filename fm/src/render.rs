//! Text rendering for schemas, source tables, mappings and validation results
//!
//! Required and optional fields are shown in separate groups, required first.
//! This grouping only affects display; the mapping itself is order-independent.

use colored::Colorize;
use std::fmt::Write;

use crate::mapping::{Choice, Mapping};
use crate::schema::{FieldSpec, Schema};
use crate::table::SourceTable;
use crate::validate::ValidationResult;

/// Split fields into required and optional, each keeping schema order
pub fn partition(fields: &[FieldSpec]) -> (Vec<&FieldSpec>, Vec<&FieldSpec>) {
    fields.iter().partition(|f| f.required)
}

pub fn schema_summary(name: &str, schema: &Schema) -> String {
    format!(
        "{} {} ({}): {} fields, {} required",
        "✓".green(),
        schema.display_name().bold(),
        name,
        schema.fields.len(),
        schema.required_count()
    )
}

/// Field table: name, type, required flag, description and enum values
pub fn field_table(schema: &Schema) -> String {
    let mut out = String::new();
    let width = name_width(&schema.fields);

    let _ = writeln!(out, "{:width$}  {:10}  {:8}  {}", "FIELD", "TYPE", "REQUIRED", "DESCRIPTION");
    for field in &schema.fields {
        let required = if field.required { "yes" } else { "no" };
        let _ = writeln!(
            out,
            "{:width$}  {:10}  {:8}  {}",
            field.target_field,
            field.field_type.to_string(),
            required,
            field.description
        );
        if !field.enum_values().is_empty() {
            let _ = writeln!(out, "{:width$}  values: {}", "", field.enum_values().join(", "));
        }
    }

    if schema.fields.is_empty() {
        let _ = writeln!(out, "{}", "Schema defines no fields".yellow());
    }
    out
}

/// Row/column counts, size, column names and the first rows of a table
pub fn source_summary(table: &SourceTable, preview_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "✓".green(), table.name().bold());
    let _ = writeln!(
        out,
        "  Rows: {}  Columns: {}  Size: {:.2} KB",
        table.row_count(),
        table.columns().len(),
        table.size_bytes() as f64 / 1024.0
    );
    let _ = writeln!(out, "  Columns: {}", table.columns().join(", "));

    let preview = table.preview(preview_rows);
    if !preview.is_empty() {
        let _ = writeln!(out, "  Preview (first {} rows):", preview.len());
        let _ = writeln!(out, "    {}", table.columns().join(" | "));
        for row in preview {
            let _ = writeln!(out, "    {}", row.join(" | "));
        }
    }
    out
}

/// Current mapping, grouped into required and optional fields
pub fn mapping_table(fields: &[FieldSpec], mapping: &Mapping) -> String {
    let mut out = String::new();
    let width = name_width(fields);
    let (required, optional) = partition(fields);

    for (title, group) in [("Required fields", required), ("Optional fields", optional)] {
        if group.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{}", title.bright_cyan());
        for field in group {
            let choice = mapping.get(&field.target_field).cloned().unwrap_or(Choice::Unmapped);
            let shown = match &choice {
                Choice::Column(c) => c.green(),
                Choice::Unmapped if field.required => choice.to_string().red(),
                Choice::Unmapped => choice.to_string().dimmed(),
            };
            let _ = writeln!(
                out,
                "  {:width$}  <- {}  [{}] {}",
                field.target_field,
                shown,
                field.field_type,
                field.description.dimmed()
            );
        }
    }
    out
}

pub fn validation_report(result: &ValidationResult) -> String {
    let mut out = String::new();
    for issue in &result.errors {
        let _ = writeln!(out, "{} {}: {}", "✗".red(), issue.field.bold(), issue.reason);
    }
    for field in &result.warnings {
        let _ = writeln!(out, "{} {}: optional field not mapped, output will be empty", "!".yellow(), field);
    }
    if result.is_valid() {
        let _ = writeln!(out, "{} Mapping is valid", "✓".green());
    } else {
        let _ = writeln!(out, "{} {} required field(s) unmapped", "✗".red(), result.errors.len());
    }
    out
}

fn name_width(fields: &[FieldSpec]) -> usize {
    fields.iter().map(|f| f.target_field.len()).max().unwrap_or(0).max(5)
}
