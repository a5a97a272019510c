//! Schema directory listing and loading

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::Schema;
use crate::error::MapError;

/// A schema file found in the catalog directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    /// File name, doubles as the display identifier
    pub name: String,
    pub path: PathBuf,
}

/// A directory of `*.json` schema definitions
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    dir: PathBuf,
    entries: Vec<SchemaEntry>,
}

impl SchemaCatalog {
    /// Open a schema directory and list its schema files
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, MapError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(MapError::SchemaDirectoryMissing(dir));
        }

        let read_dir = fs::read_dir(&dir).map_err(|_| MapError::SchemaDirectoryMissing(dir.clone()))?;

        let mut entries = Vec::new();
        for entry in read_dir.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                entries.push(SchemaEntry {
                    name: name.to_string(),
                    path: path.clone(),
                });
            }
        }

        if entries.is_empty() {
            return Err(MapError::SchemaNotFound(dir));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Opened schema catalog {} ({} schemas)", dir.display(), entries.len());
        Ok(Self { dir, entries })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Find an entry by file name, with or without the `.json` extension
    pub fn entry(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name || e.name.strip_suffix(".json") == Some(name))
    }

    /// Load a single schema by name
    pub fn load(&self, name: &str) -> Result<Schema, MapError> {
        let entry = self.entry(name).ok_or_else(|| MapError::UnknownSchema(name.to_string()))?;
        load_entry(entry)
    }

    /// Load every schema; a broken file yields an error for that entry only
    pub fn load_all(&self) -> Vec<(SchemaEntry, Result<Schema, MapError>)> {
        self.entries
            .iter()
            .map(|entry| {
                let result = load_entry(entry);
                if let Err(e) = &result {
                    warn!("Skipping schema {}: {}", entry.name, e);
                }
                (entry.clone(), result)
            })
            .collect()
    }
}

fn load_entry(entry: &SchemaEntry) -> Result<Schema, MapError> {
    let content = fs::read_to_string(&entry.path).map_err(|e| MapError::SchemaParse {
        name: entry.name.clone(),
        reason: e.to_string(),
    })?;
    let schema = Schema::from_json(&entry.name, &content)?;
    if schema.fields.is_empty() {
        warn!("Schema {} defines no fields", entry.name);
    }
    debug!("Loaded schema {} with {} fields", entry.name, schema.fields.len());
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = SchemaCatalog::open(temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, MapError::SchemaDirectoryMissing(_)));
    }

    #[test]
    fn test_no_schemas() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "notes.txt", "not a schema");
        let err = SchemaCatalog::open(temp.path()).unwrap_err();
        assert!(matches!(err, MapError::SchemaNotFound(_)));
    }

    #[test]
    fn test_entries_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "orders.json", r#"{"fields": []}"#);
        write(temp.path(), "customers.json", r#"{"fields": []}"#);
        write(temp.path(), "readme.md", "# schemas");

        let catalog = SchemaCatalog::open(temp.path()).unwrap();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["customers.json", "orders.json"]);
    }

    #[test]
    fn test_load_by_name_with_or_without_extension() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "customers.json",
            r#"{"contract_name": "customers", "fields": [{"target_field": "id", "type": "string", "required": true}]}"#,
        );

        let catalog = SchemaCatalog::open(temp.path()).unwrap();
        assert_eq!(catalog.load("customers.json").unwrap().display_name(), "customers");
        assert_eq!(catalog.load("customers").unwrap().fields.len(), 1);
        assert!(matches!(catalog.load("orders"), Err(MapError::UnknownSchema(_))));
    }

    #[test]
    fn test_broken_file_does_not_block_others() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a_broken.json", "{ nope");
        write(temp.path(), "b_good.json", r#"{"contract_name": "good"}"#);

        let catalog = SchemaCatalog::open(temp.path()).unwrap();
        let loaded = catalog.load_all();
        assert_eq!(loaded.len(), 2);
        assert!(matches!(loaded[0].1, Err(MapError::SchemaParse { .. })));
        assert_eq!(loaded[1].1.as_ref().unwrap().display_name(), "good");
    }
}
