//! # jst-cli — CLI for json-schema-toolkit
//!
//! Provides the `jst` command-line interface over declaration files and
//! JSON or YAML documents.
//!
//! ## Subcommands
//!
//! - `jst schema`: Emit the schema of a declaration file.
//! - `jst validate`: Check a document against a declaration.
//! - `jst get`: Read a field or nested fragment of a document.
//! - `jst set`: Write a field or nested fragment through the validated
//!   document and print or save the result.
//!
//! ```bash
//! jst schema declarations/history.yaml
//! jst validate declarations/history.yaml history.json
//! jst get declarations/history.yaml history.json events/0/title
//! jst set declarations/history.yaml history.json events/0/importance 3 --output out.yaml
//! ```
//!
//! Every handler returns the process exit code: 0 on success, 1 when the
//! document is rejected. Operational failures (unreadable files, bad
//! arguments) are `anyhow` errors.

pub mod access;
pub mod files;
pub mod schema;
pub mod validate;

use std::io::Write;

use jst_document::DocumentError;
use jst_store::StoreError;

/// Print the violations of a rejected document to `err` and return exit
/// code 1; any other document error is returned as is.
pub(crate) fn report_rejection(err: DocumentError, out: &mut dyn Write) -> anyhow::Result<u8> {
    match err {
        DocumentError::Store(StoreError::Validation(rejection)) => {
            writeln!(out, "INVALID")?;
            match rejection.violations() {
                Some(violations) => writeln!(out, "{violations}")?,
                None => writeln!(out, "  {rejection}")?,
            }
            Ok(1)
        }
        other => Err(other.into()),
    }
}
