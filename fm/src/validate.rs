//! Mapping validation
//!
//! Required fields left unmapped are errors and block export. Optional fields
//! left unmapped are warnings only.

use serde::Serialize;

use crate::error::MapError;
use crate::mapping::Mapping;
use crate::schema::FieldSpec;

/// A required field that blocks export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub reason: String,
}

/// Outcome of validating a mapping against a schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    /// Optional fields left unmapped
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_fields(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.field.clone()).collect()
    }

    /// Convert into an error listing the unmapped required fields
    pub fn into_result(self) -> Result<Self, MapError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(MapError::MappingIncomplete(self.error_fields()))
        }
    }
}

/// Validate a mapping; recompute whenever the mapping changes
pub fn validate(fields: &[FieldSpec], mapping: &Mapping) -> ValidationResult {
    let mut result = ValidationResult::default();

    for field in fields.iter().filter(|f| f.required) {
        if !mapping.is_mapped(&field.target_field) {
            result.errors.push(ValidationIssue {
                field: field.target_field.clone(),
                reason: "required field is not mapped to a source column".to_string(),
            });
        }
    }

    for field in fields.iter().filter(|f| !f.required) {
        if !mapping.is_mapped(&field.target_field) {
            result.warnings.push(field.target_field.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Selections, build_mapping};
    use crate::schema::FieldType;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("name", FieldType::String, true),
            FieldSpec::new("id", FieldType::String, true),
            FieldSpec::new("notes", FieldType::String, false),
        ]
    }

    fn mapping(pairs: &[&str]) -> Mapping {
        let columns = vec!["full_name".to_string(), "customer_id".to_string()];
        build_mapping(&fields(), &columns, &Selections::from_pairs(pairs).unwrap())
    }

    #[test]
    fn test_valid_with_optional_warning() {
        let result = validate(&fields(), &mapping(&["name=full_name", "id=customer_id"]));
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings, ["notes".to_string()]);
    }

    #[test]
    fn test_missing_required_is_error() {
        let result = validate(&fields(), &mapping(&["id=customer_id"]));
        assert!(!result.is_valid());
        assert_eq!(result.error_fields(), ["name".to_string()]);
        assert_eq!(result.warnings, ["notes".to_string()]);

        let err = result.into_result().unwrap_err();
        assert!(matches!(err, MapError::MappingIncomplete(ref f) if f == &["name".to_string()]));
    }

    #[test]
    fn test_empty_mapping() {
        let result = validate(&fields(), &Mapping::default());
        assert_eq!(result.error_fields(), ["name".to_string(), "id".to_string()]);
    }

    #[test]
    fn test_no_fields_is_valid() {
        assert!(validate(&[], &Mapping::default()).is_valid());
    }

    #[test]
    fn test_fully_mapped_has_no_warnings() {
        let result = validate(&fields(), &mapping(&["name=full_name", "id=customer_id", "notes=full_name"]));
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }
}
