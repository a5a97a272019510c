use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use fieldmap::cli::{Cli, Command, MappingArgs};
use fieldmap::config::Config;
use fieldmap::repl::{Repl, ReplCommand};
use fieldmap::{Schema, SchemaCatalog, Selections, SourceTable, build_mapping, export, render, validate};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.schema_dir {
        config.schema_dir = dir;
    }
    debug!("fieldmap starting with schema dir {}", config.schema_dir.display());

    match cli.command {
        Command::Schemas => cmd_schemas(&config),
        Command::Show { schema, json } => cmd_show(&config, &schema, json),
        Command::Inspect { file, rows } => cmd_inspect(&config, &file, rows),
        Command::Check { schema, file, mapping } => cmd_check(&config, &schema, &file, &mapping),
        Command::Export {
            schema,
            file,
            mapping,
            output,
        } => cmd_export(&config, &schema, &file, &mapping, output),
        Command::Repl { schema, file } => cmd_repl(config, schema, file),
    }
}

fn cmd_schemas(config: &Config) -> Result<()> {
    let catalog = SchemaCatalog::open(&config.schema_dir)?;
    for (entry, result) in catalog.load_all() {
        match result {
            Ok(schema) => println!(
                "{} {:24} {:24} {} fields, {} required",
                "✓".green(),
                entry.name,
                schema.display_name(),
                schema.fields.len(),
                schema.required_count()
            ),
            Err(e) => println!("{} {:24} {}", "✗".red(), entry.name, e.to_string().red()),
        }
    }
    Ok(())
}

fn cmd_show(config: &Config, name: &str, json: bool) -> Result<()> {
    let schema = load_schema(config, name)?;
    if json {
        println!("{}", schema.to_pretty_json());
    } else {
        println!("{}", render::schema_summary(name, &schema));
        print!("{}", render::field_table(&schema));
    }
    Ok(())
}

fn cmd_inspect(config: &Config, file: &Path, rows: Option<usize>) -> Result<()> {
    let table = SourceTable::load(file, config.delimiter_byte())?;
    print!("{}", render::source_summary(&table, rows.unwrap_or(config.preview_rows)));
    Ok(())
}

fn cmd_check(config: &Config, name: &str, file: &Path, args: &MappingArgs) -> Result<()> {
    let (schema, table, selections) = prepare(config, name, file, args)?;
    let mapping = build_mapping(&schema.fields, table.columns(), &selections);
    let result = validate(&schema.fields, &mapping);

    print!("{}", render::mapping_table(&schema.fields, &mapping));
    print!("{}", render::validation_report(&result));

    result.into_result()?;
    Ok(())
}

fn cmd_export(config: &Config, name: &str, file: &Path, args: &MappingArgs, output: Option<PathBuf>) -> Result<()> {
    let (schema, table, selections) = prepare(config, name, file, args)?;
    let mapping = build_mapping(&schema.fields, table.columns(), &selections);
    let result = validate(&schema.fields, &mapping);
    if !result.is_valid() {
        print!("{}", render::validation_report(&result));
    }

    let out = export(&schema.fields, &mapping, &table)?;
    let path = output.unwrap_or_else(|| config.output_path(table.name()));
    out.save(&path, config.delimiter_byte())
        .context(format!("Failed to write {}", path.display()))?;

    info!("Exported {} to {}", table.name(), path.display());
    println!("{} Exported {} rows to {}", "✓".green(), out.row_count(), path.display().to_string().cyan());
    Ok(())
}

fn cmd_repl(config: Config, schema: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let mut initial = Vec::new();
    if let Some(schema) = schema {
        initial.push(ReplCommand::Use(schema));
    }
    if let Some(file) = file {
        initial.push(ReplCommand::Load(file));
    }

    let mut repl = Repl::new(config)?;
    repl.run(initial)
}

fn load_schema(config: &Config, name: &str) -> Result<Schema> {
    let catalog = SchemaCatalog::open(&config.schema_dir)?;
    Ok(catalog.load(name)?)
}

/// Load schema, table and checked selections; `--map` entries override the mapping file
fn prepare(config: &Config, name: &str, file: &Path, args: &MappingArgs) -> Result<(Schema, SourceTable, Selections)> {
    let schema = load_schema(config, name)?;
    let table = SourceTable::load(file, config.delimiter_byte())?;

    let mut selections = match &args.mapping_file {
        Some(path) => Selections::load(path)?,
        None => Selections::new(),
    };
    selections.merge(Selections::from_pairs(&args.map)?);
    selections.check(&schema.fields, table.columns())?;

    Ok((schema, table, selections))
}
