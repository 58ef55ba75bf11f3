//! # Get and Set Subcommands
//!
//! Navigate a document by a slash-separated path (`events/0/title`). The
//! first segment names a field; later segments are object keys or array
//! indices, chosen by the schema of the region being entered.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use jst_core::{Kind, Segment};
use jst_document::{Document, Entry, FragmentProxy};
use serde_json::Value;

use crate::files::{load_definition, read_document, write_document};
use crate::report_rejection;

/// Arguments for the `jst get` subcommand.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Declaration file (YAML or JSON).
    pub declaration: PathBuf,

    /// Document to read (YAML or JSON).
    pub document: PathBuf,

    /// Path of the value, e.g. `events/0/title`.
    pub path: String,
}

/// Arguments for the `jst set` subcommand.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Declaration file (YAML or JSON).
    pub declaration: PathBuf,

    /// Document to modify (YAML or JSON).
    pub document: PathBuf,

    /// Path of the value, e.g. `events/0/importance`.
    pub path: String,

    /// New value as JSON. Text that is not valid JSON is taken as a string.
    pub value: String,

    /// Save the result here instead of printing it.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the get subcommand.
pub fn run_get(args: &GetArgs, out: &mut dyn Write) -> Result<u8> {
    let definition = load_definition(&args.declaration)?;
    let doc = Document::open(definition, read_document(&args.document)?);
    let (field, rest) = split_path(&args.path)?;

    let mut entry = doc.read(field)?;
    for part in rest {
        entry = match entry {
            Entry::Fragment(proxy) => proxy.get(segment_for(&proxy, part)?)?,
            Entry::Value(value) => Entry::Value(descend(&value, part)?),
        };
    }

    let value = entry.into_value()?;
    writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    Ok(0)
}

/// Execute the set subcommand.
pub fn run_set(args: &SetArgs, out: &mut dyn Write) -> Result<u8> {
    let definition = load_definition(&args.declaration)?;
    let value = read_document(&args.document)?;
    let doc = match Document::open_validated(definition, value) {
        Ok(doc) => doc,
        Err(err) => return report_rejection(err, out),
    };
    let new_value = parse_value(&args.value);
    let (field, rest) = split_path(&args.path)?;

    let written = if rest.is_empty() {
        doc.write(field, new_value)
    } else {
        let mut proxy = fragment(doc.read(field)?, field)?;
        let mut depth = 0;
        loop {
            let segment = segment_for(&proxy, rest[depth])?;
            if depth + 1 == rest.len() {
                break proxy.set(segment, new_value);
            }
            match proxy.get(segment.clone())? {
                Entry::Fragment(child) => {
                    proxy = child;
                    depth += 1;
                }
                Entry::Value(mut region) => {
                    // Undeclared region: edit a copy and write it back whole.
                    let pointer: String = rest[depth + 1..]
                        .iter()
                        .map(|part| format!("/{}", part.replace('~', "~0")))
                        .collect();
                    let target = region
                        .pointer_mut(&pointer)
                        .ok_or_else(|| anyhow!("no value at '{}'", args.path))?;
                    *target = new_value;
                    break proxy.set(segment, region);
                }
            }
        }
    };
    if let Err(err) = written {
        return report_rejection(err, out);
    }
    tracing::debug!(path = %args.path, revision = doc.revision(), "field written");

    let result = doc.into_value();
    match &args.output {
        Some(path) => write_document(path, &result)?,
        None => writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?,
    }
    Ok(0)
}

fn split_path(path: &str) -> Result<(&str, Vec<&str>)> {
    let mut parts = path.split('/').filter(|p| !p.is_empty());
    let field = parts.next().ok_or_else(|| anyhow!("empty path"))?;
    Ok((field, parts.collect()))
}

fn descend(value: &Value, part: &str) -> Result<Value> {
    let child = match value {
        Value::Array(items) => {
            let index = part
                .parse::<usize>()
                .with_context(|| format!("'{part}' is not an array index"))?;
            items.get(index)
        }
        Value::Object(map) => map.get(part),
        _ => bail!("cannot descend into '{part}': parent is not an object or array"),
    };
    child.cloned().ok_or_else(|| anyhow!("no value at '{part}'"))
}

fn fragment(entry: Entry, part: &str) -> Result<FragmentProxy> {
    entry
        .into_fragment()
        .ok_or_else(|| anyhow!("cannot descend below '{part}': not an object or array"))
}

/// Arrays are entered by index, everything else by key.
fn segment_for(proxy: &FragmentProxy, part: &str) -> Result<Segment> {
    let is_array = proxy.schema()?.map(|node| node.kind() == Kind::Array);
    let is_array = match is_array {
        Some(is_array) => is_array,
        None => proxy.value()?.is_array(),
    };
    if is_array {
        let index = part
            .parse::<usize>()
            .with_context(|| format!("'{part}' is not an array index"))?;
        Ok(Segment::Index(index))
    } else {
        Ok(Segment::Key(part.to_string()))
    }
}

fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_path_separates_field() {
        let (field, rest) = split_path("events/0/title").unwrap();
        assert_eq!(field, "events");
        assert_eq!(rest, ["0", "title"]);
        assert!(split_path("/").is_err());
    }

    #[test]
    fn descend_plain_values() {
        let value = json!({"tags": ["a", "b"]});
        assert_eq!(descend(&value, "tags").unwrap(), json!(["a", "b"]));
        assert_eq!(descend(&json!(["a", "b"]), "1").unwrap(), json!("b"));
        assert!(descend(&json!(["a"]), "x").is_err());
        assert!(descend(&json!("a"), "x").is_err());
        assert!(descend(&value, "missing").is_err());
    }

    #[test]
    fn parse_value_falls_back_to_string() {
        assert_eq!(parse_value("3"), json!(3));
        assert_eq!(parse_value("{\"a\": true}"), json!({"a": true}));
        assert_eq!(parse_value("Atlantis"), json!("Atlantis"));
    }
}
