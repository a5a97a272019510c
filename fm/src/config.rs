//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::DEFAULT_OUTPUT_PREFIX;

/// Main fieldmap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `*.json` schema files
    #[serde(rename = "schema-dir")]
    pub schema_dir: PathBuf,

    /// Directory exported files are written to
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Prefix prepended to the input file name on export
    #[serde(rename = "output-prefix")]
    pub output_prefix: String,

    /// Rows shown when previewing a source table
    #[serde(rename = "preview-rows")]
    pub preview_rows: usize,

    /// Field delimiter for input and output files
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schemas"),
            output_dir: PathBuf::from("."),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            preview_rows: 5,
            delimiter: ',',
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .fieldmap.yml
        let local_config = PathBuf::from(".fieldmap.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/fieldmap/fieldmap.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("fieldmap").join("fieldmap.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() {
            return Err(eyre::eyre!("Delimiter must be a single ASCII character, got '{}'", self.delimiter));
        }
        Ok(())
    }

    /// Delimiter as the byte the csv reader and writer expect
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() { self.delimiter as u8 } else { b',' }
    }

    /// Where an export of `input_name` goes when no explicit path is given
    pub fn output_path(&self, input_name: &str) -> PathBuf {
        self.output_dir
            .join(crate::export::output_file_name(input_name, &self.output_prefix))
    }
}
