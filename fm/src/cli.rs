//! CLI argument parsing for fieldmap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fm")]
#[command(author, version, about = "Map tabular files onto declarative field schemas", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Schema directory (overrides config)
    #[arg(short = 'd', long, global = true)]
    pub schema_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Field selections given on the command line or in a mapping file
#[derive(Args, Debug, Clone, Default)]
pub struct MappingArgs {
    /// Map a schema field to a source column (field=column), repeatable
    #[arg(short, long = "map", value_name = "FIELD=COLUMN")]
    pub map: Vec<String>,

    /// YAML or JSON mapping file (field: column); --map entries take precedence
    #[arg(long = "mapping", value_name = "FILE")]
    pub mapping_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available schemas
    Schemas,

    /// Show the fields of a schema
    Show {
        /// Schema file name
        #[arg(required = true)]
        schema: String,

        /// Print the full schema definition as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize a source file and preview its rows
    Inspect {
        /// Source CSV file
        #[arg(required = true)]
        file: PathBuf,

        /// Number of rows to preview (default: from config)
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Validate a mapping without exporting
    Check {
        /// Schema file name
        #[arg(required = true)]
        schema: String,

        /// Source CSV file
        #[arg(required = true)]
        file: PathBuf,

        #[command(flatten)]
        mapping: MappingArgs,
    },

    /// Validate a mapping and export the reshaped file
    Export {
        /// Schema file name
        #[arg(required = true)]
        schema: String,

        /// Source CSV file
        #[arg(required = true)]
        file: PathBuf,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Output path (default: <output-dir>/<output-prefix><file name>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Map fields interactively
    Repl {
        /// Schema to start with
        #[arg(short, long)]
        schema: Option<String>,

        /// Source CSV file to start with
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export() {
        let cli = Cli::parse_from([
            "fm",
            "export",
            "customers.json",
            "in.csv",
            "-m",
            "name=full_name",
            "--map",
            "id=customer_id",
            "-o",
            "out.csv",
        ]);
        match cli.command {
            Command::Export {
                schema,
                file,
                mapping,
                output,
            } => {
                assert_eq!(schema, "customers.json");
                assert_eq!(file, PathBuf::from("in.csv"));
                assert_eq!(mapping.map, ["name=full_name", "id=customer_id"]);
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["fm", "schemas", "-d", "/tmp/schemas", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.schema_dir, Some(PathBuf::from("/tmp/schemas")));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
