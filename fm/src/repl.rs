//! Interactive mapping session
//!
//! Each input line is parsed into a `ReplCommand`. Commands that change state
//! become session events; the session is replaced by the result of applying
//! the event. Recoverable errors are printed and the loop keeps going; a fatal
//! error such as the schema directory disappearing ends it.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fmt::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::MapError;
use crate::mapping::Selections;
use crate::render;
use crate::schema::SchemaCatalog;
use crate::session::{Event, Session};
use crate::table::SourceTable;

/// A parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Quit,
    Schemas,
    Use(String),
    Load(PathBuf),
    Fields,
    Columns,
    Preview,
    Map { field: String, column: String },
    Unmap(String),
    Status,
    Details,
    Save(PathBuf),
    Export(Option<PathBuf>),
}

impl ReplCommand {
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        let (cmd, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
        let rest = rest.trim();

        let arg = |usage: &str| {
            if rest.is_empty() {
                Err(format!("Usage: {}", usage))
            } else {
                Ok(rest.to_string())
            }
        };

        match cmd {
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            "schemas" => Ok(Self::Schemas),
            "use" => arg("use <schema>").map(Self::Use),
            "load" => arg("load <file>").map(|p| Self::Load(PathBuf::from(p))),
            "fields" | "mapping" => Ok(Self::Fields),
            "columns" => Ok(Self::Columns),
            "preview" => Ok(Self::Preview),
            "map" => {
                let usage = "map <field> <column>";
                let rest = arg(usage)?;
                match take_word(&rest) {
                    Some((field, column)) if !field.is_empty() && !column.trim().is_empty() => Ok(Self::Map {
                        field: field.to_string(),
                        column: unquote(column.trim()).to_string(),
                    }),
                    _ => Err(format!("Usage: {}", usage)),
                }
            }
            "unmap" => arg("unmap <field>").map(|f| Self::Unmap(unquote(&f).to_string())),
            "status" => Ok(Self::Status),
            "details" => Ok(Self::Details),
            "save" => arg("save <file>").map(|p| Self::Save(PathBuf::from(p))),
            "export" => Ok(Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest)))),
            _ => Err(format!("Unknown command: {}", cmd)),
        }
    }
}

/// Split off the first word, which may be double-quoted to contain spaces
fn take_word(input: &str) -> Option<(&str, &str)> {
    match input.strip_prefix('"') {
        Some(quoted) => quoted.split_once('"'),
        None => Some(input.split_once(char::is_whitespace).unwrap_or((input, ""))),
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

/// Interactive mapping session
pub struct Repl {
    config: Config,
    catalog: SchemaCatalog,
    session: Session,
    show_details: bool,
}

impl Repl {
    /// Create a REPL over a schema catalog; a missing or empty catalog is fatal
    pub fn new(config: Config) -> Result<Self, MapError> {
        let catalog = SchemaCatalog::open(&config.schema_dir)?;
        Ok(Self {
            config,
            catalog,
            session: Session::new(),
            show_details: false,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the REPL main loop
    pub fn run(&mut self, initial: Vec<ReplCommand>) -> Result<()> {
        self.print_welcome();

        for cmd in initial {
            self.dispatch(cmd);
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", "fm>".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    match ReplCommand::parse(input) {
                        Ok(cmd) => {
                            if !self.dispatch(cmd) {
                                break;
                            }
                        }
                        Err(msg) => {
                            println!("{} {}", "?".yellow(), msg);
                            println!("Type {} for available commands", "help".yellow());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Execute and print; returns false when the loop should stop
    fn dispatch(&mut self, cmd: ReplCommand) -> bool {
        match self.execute(cmd) {
            Ok(Outcome::Continue(text)) => {
                print!("{}", text);
                true
            }
            Ok(Outcome::Quit) => false,
            Err(e) => {
                println!("{} {}", "Error:".red(), e);
                for field in e.fields() {
                    println!("  - {}", field);
                }
                !e.is_fatal()
            }
        }
    }

    /// Execute one command against the current session
    pub fn execute(&mut self, cmd: ReplCommand) -> Result<Outcome, MapError> {
        let mut out = String::new();

        match cmd {
            ReplCommand::Help => out = help_text(),
            ReplCommand::Quit => return Ok(Outcome::Quit),
            ReplCommand::Schemas => {
                self.catalog = SchemaCatalog::open(&self.config.schema_dir)?;
                for entry in self.catalog.entries() {
                    let marker = match self.session.schema() {
                        Some(selected) if selected.name == entry.name => "*",
                        _ => " ",
                    };
                    let _ = writeln!(out, "{} {}", marker, entry.name);
                }
            }
            ReplCommand::Use(name) => {
                let schema = self.catalog.load(&name)?;
                let name = self.catalog.entry(&name).map(|e| e.name.clone()).unwrap_or(name);
                let _ = writeln!(out, "{}", render::schema_summary(&name, &schema));
                self.session = self.session.apply(Event::SchemaSelected { name, schema })?;
            }
            ReplCommand::Load(path) => {
                let table = SourceTable::load(&path, self.config.delimiter_byte())?;
                out.push_str(&render::source_summary(&table, self.config.preview_rows));
                self.session = self.session.apply(Event::FileUploaded(table))?;
            }
            ReplCommand::Fields => {
                let selected = self.session.schema().ok_or(MapError::NothingSelected("schema"))?;
                if self.session.table().is_some() {
                    out.push_str(&render::mapping_table(&selected.schema.fields, self.session.mapping()));
                } else {
                    out.push_str(&render::field_table(&selected.schema));
                }
                if self.show_details {
                    let _ = writeln!(out, "{}", selected.schema.to_pretty_json());
                }
            }
            ReplCommand::Columns => {
                let table = self.session.table().ok_or(MapError::NothingSelected("file"))?;
                let _ = writeln!(out, "{}", table.columns().join(", "));
            }
            ReplCommand::Preview => {
                let table = self.session.table().ok_or(MapError::NothingSelected("file"))?;
                out.push_str(&render::source_summary(table, self.config.preview_rows));
            }
            ReplCommand::Map { field, column } => {
                self.session = self.session.apply(Event::ColumnSelected { field, column })?;
                out.push_str(&render::validation_report(self.session.validation()));
            }
            ReplCommand::Unmap(field) => {
                self.session = self.session.apply(Event::FieldCleared { field })?;
                out.push_str(&render::validation_report(self.session.validation()));
            }
            ReplCommand::Status => {
                self.session.schema().ok_or(MapError::NothingSelected("schema"))?;
                self.session.table().ok_or(MapError::NothingSelected("file"))?;
                out.push_str(&render::validation_report(self.session.validation()));
            }
            ReplCommand::Details => {
                self.show_details = !self.show_details;
                let state = if self.show_details { "on" } else { "off" };
                let _ = writeln!(out, "Schema details {}", state);
            }
            ReplCommand::Save(path) => {
                let selections: Selections = self.session.mapping().to_selections();
                selections.save(&path)?;
                let _ = writeln!(out, "{} Saved mapping to {}", "✓".green(), path.display());
            }
            ReplCommand::Export(path) => {
                let output = self.session.export()?;
                let table = self.session.table().ok_or(MapError::NothingSelected("file"))?;
                let path = path.unwrap_or_else(|| self.config.output_path(table.name()));
                output.save(&path, self.config.delimiter_byte())?;
                let _ = writeln!(
                    out,
                    "{} Exported {} rows to {}",
                    "✓".green(),
                    output.row_count(),
                    path.display()
                );
            }
        }

        Ok(Outcome::Continue(out))
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Fieldmap Interactive Mapping".bright_cyan().bold());
        println!("Schema directory: {}", self.catalog.dir().display());
        println!("Type {} for help, {} to quit", "help".yellow(), "quit".yellow());
        println!();
    }
}

fn help_text() -> String {
    let commands = [
        ("schemas", "Rescan and list available schemas"),
        ("use <schema>", "Select a schema"),
        ("load <file>", "Load a source CSV file"),
        ("fields", "Show schema fields and their mapping"),
        ("columns", "List source columns"),
        ("preview", "Summarize and preview the source file"),
        ("map <f> <col>", "Map a field to a source column; quote names with spaces"),
        ("unmap <field>", "Clear a field's mapping"),
        ("status", "Validate the current mapping"),
        ("details", "Toggle the full schema definition"),
        ("save <file>", "Save the mapping as YAML"),
        ("export [file]", "Export the mapped file"),
        ("quit", "Exit"),
    ];

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Available Commands:".bright_cyan());
    for (cmd, desc) in commands {
        let _ = writeln!(out, "  {:16} {}", cmd.yellow(), desc);
    }
    out
}
