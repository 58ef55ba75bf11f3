//! # Validate Subcommand
//!
//! Opens a document with validation enabled and reports whether it
//! conforms to its declaration.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use jst_document::Document;

use crate::files::{load_definition, read_document};
use crate::report_rejection;

/// Arguments for the `jst validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Declaration file (YAML or JSON).
    pub declaration: PathBuf,

    /// Document to check (YAML or JSON).
    pub document: PathBuf,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<u8> {
    let definition = load_definition(&args.declaration)?;
    let value = read_document(&args.document)?;
    match Document::open_validated(definition, value) {
        Ok(_) => {
            writeln!(out, "VALID")?;
            Ok(0)
        }
        Err(err) => report_rejection(err, out),
    }
}
