//! # jst CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jst_cli::access::{run_get, run_set, GetArgs, SetArgs};
use jst_cli::schema::{run_schema, SchemaArgs};
use jst_cli::validate::{run_validate, ValidateArgs};

/// json-schema-toolkit CLI.
///
/// Emits JSON Schemas from field declarations, validates documents against
/// them, and reads or writes document fields with validation.
#[derive(Parser, Debug)]
#[command(name = "jst", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the schema emitted from a declaration file.
    Schema(SchemaArgs),

    /// Check a document against a declaration file.
    Validate(ValidateArgs),

    /// Read a field or nested value of a document.
    Get(GetArgs),

    /// Write a field or nested value of a document, with validation.
    Set(SetArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Without -v, RUST_LOG decides; warnings only if that is unset too.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("jst CLI starting");

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::Schema(args) => run_schema(&args, &mut stdout),
        Commands::Validate(args) => run_validate(&args, &mut stdout),
        Commands::Get(args) => run_get(&args, &mut stdout),
        Commands::Set(args) => run_set(&args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
