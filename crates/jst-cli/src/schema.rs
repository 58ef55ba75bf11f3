//! # Schema Subcommand
//!
//! Prints the schema emitted from a declaration file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::files::load_definition;

/// Arguments for the `jst schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Declaration file (YAML or JSON).
    pub declaration: PathBuf,

    /// Print the Draft 7 rendering used for validation instead of the
    /// emitted schema.
    #[arg(long)]
    pub validation: bool,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, out: &mut dyn Write) -> Result<u8> {
    let definition = load_definition(&args.declaration)?;
    let schema = if args.validation {
        definition.schema().to_json_schema()
    } else {
        definition.schema().to_value()
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&schema)?)?;
    Ok(0)
}
