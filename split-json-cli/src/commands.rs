//! Command handlers.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use split_json_adapter::{AdapterConfig, SplitJsonAdapter};

use crate::cli::{Cli, Commands};

/// Open the adapter described by the configuration sources and `--dir`.
pub fn open(cli: &Cli) -> Result<SplitJsonAdapter> {
    let mut config = AdapterConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.dir {
        config.directory = dir.clone();
    }
    let adapter = config.open()?;
    tracing::debug!("Opened '{}'", adapter.directory().display());
    Ok(adapter)
}

/// Run the selected command.
pub fn run(cli: &Cli, input: &mut impl Read, out: &mut impl Write) -> Result<()> {
    let adapter = open(cli)?;
    match &cli.command {
        Commands::Read { key } => read(&adapter, key.as_deref(), out),
        Commands::Write { file } => write(&adapter, file.as_deref(), input, out),
        Commands::Set { key, value } => set(&adapter, key, value, out),
        Commands::Classify => classify(&adapter, out),
    }
}

/// Print the whole record, or one key of it.
pub fn read(adapter: &SplitJsonAdapter, key: Option<&str>, out: &mut impl Write) -> Result<()> {
    let record = adapter.read()?;
    let value = match key {
        Some(key) => record
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("key '{}' not found", key))?,
        None => Value::Object(record),
    };
    print_json(out, &value)
}

/// Persist the JSON object found in `file`, or in `input` when no file is given.
pub fn write(
    adapter: &SplitJsonAdapter,
    file: Option<&Path>,
    input: &mut impl Read,
    out: &mut impl Write,
) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?,
        None => {
            let mut text = String::new();
            input
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };

    let value: Value = serde_json::from_str(&text).context("input is not valid JSON")?;
    let Some(record) = value.as_object() else {
        bail!("input must be a JSON object");
    };

    let summary = adapter.write_with_summary(record)?;
    print_json(out, &serde_json::to_value(&summary)?)
}

/// Read the record, replace `key` with `value` and write it back.
pub fn set(adapter: &SplitJsonAdapter, key: &str, value: &str, out: &mut impl Write) -> Result<()> {
    let value: Value =
        serde_json::from_str(value).with_context(|| format!("value for '{}' is not valid JSON", key))?;

    let mut record = adapter.read()?;
    record.insert(key.to_string(), value);
    let summary = adapter.write_with_summary(&record)?;

    if summary.skipped.iter().any(|k| k == key) {
        tracing::warn!("'{}' is backed by a script and was not changed", key);
    }
    print_json(out, &serde_json::to_value(&summary)?)
}

/// Print buckets and diagnostics.
pub fn classify(adapter: &SplitJsonAdapter, out: &mut impl Write) -> Result<()> {
    let classification = adapter.classify()?;
    print_json(out, &serde_json::to_value(&classification)?)
}

fn print_json(out: &mut impl Write, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
