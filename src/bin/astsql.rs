//! astsql: compile a JSON statement tree to dialect SQL.
//!
//! # Usage
//!
//! ```bash
//! # Compile against the dialect from astsql.toml (or ANSI)
//! astsql statement.json
//!
//! # Pick a dialect and print JSON
//! astsql statement.json --dialect postgres --format json
//!
//! # Optional table update instead of a statement
//! astsql person_ext.json --upsert --dialect mysql
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use tracing_subscriber::EnvFilter;

use astsql::prelude::*;

#[derive(Parser)]
#[command(name = "astsql")]
#[command(version)]
#[command(about = "Compile portable statement trees to dialect SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    astsql select.json --dialect oracle
    astsql select.json --format json
    astsql person_ext.json --upsert --dialect postgres")]
struct Cli {
    /// JSON file holding the statement tree ('-' for stdin)
    file: PathBuf,

    /// Target dialect, overriding the settings file
    #[arg(short, long, env = "ASTSQL_DIALECT")]
    dialect: Option<Dialect>,

    /// Settings file (default: ./astsql.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Input is an optional table update rather than a statement
    #[arg(short, long)]
    upsert: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// What one input file compiles to.
enum Output {
    Statement(CompiledStatement),
    Operation(MutationOperation),
}

fn run(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(dialect) = cli.dialect {
        settings.dialect = dialect;
    }
    let descriptor = settings.descriptor();
    let input = read_input(&cli.file)?;

    let output = if cli.upsert {
        let update: OptionalTableUpdate =
            serde_json::from_str(&input).context("parsing optional table update")?;
        Output::Operation(translate_upsert(&update, &descriptor, settings.options)?)
    } else {
        let statement: Statement = serde_json::from_str(&input).context("parsing statement")?;
        Output::Statement(translate(&statement, &descriptor, settings.options)?)
    };

    match (&cli.format, &output) {
        (OutputFormat::Json, Output::Statement(stmt)) => println!("{}", serde_json::to_string_pretty(stmt)?),
        (OutputFormat::Json, Output::Operation(op)) => println!("{}", serde_json::to_string_pretty(op)?),
        (OutputFormat::Text, Output::Statement(stmt)) => {
            print_header(&descriptor.name);
            print_statement("SQL", stmt);
        }
        (OutputFormat::Text, Output::Operation(op)) => {
            print_header(&descriptor.name);
            print_operation(op);
        }
    }
    Ok(())
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("reading stdin");
    }
    std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))
}

fn print_header(dialect: &str) {
    println!("{} {}", "Dialect:".dimmed(), dialect.cyan());
}

fn print_operation(operation: &MutationOperation) {
    match operation {
        MutationOperation::Merge(stmt) | MutationOperation::Upsert(stmt) => print_statement("SQL", stmt),
        MutationOperation::UpdateOrInsert { update, insert, delete } => {
            print_statement("Update", update);
            print_statement("Insert if no row was updated", insert);
            if let Some(delete) = delete {
                print_statement("Delete when every value is null", delete);
            }
        }
    }
}

fn print_statement(label: &str, stmt: &CompiledStatement) {
    println!();
    println!("{}", format!("{}:", label).green().bold());
    println!("{}", stmt.sql.white());
    if !stmt.binders.is_empty() {
        println!("{}", "Binders:".cyan());
        for (i, binder) in stmt.binders.iter().enumerate() {
            println!("  {} = {}", i + 1, binder.to_string().yellow());
        }
    }
    if !stmt.affected_tables.is_empty() {
        let tables: Vec<&str> = stmt.affected_tables.iter().map(String::as_str).collect();
        println!("{} {}", "Tables:".cyan(), tables.join(", "));
    }
}
