//! CLI definition for the split JSON command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect and edit a directory holding one JSON file per key.
#[derive(Parser, Debug)]
#[command(name = "split-json")]
#[command(version)]
#[command(about = "Inspect and edit split JSON directories")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file (.toml, .yaml or .json)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data directory, overriding the configured one
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved record, or the value of one key
    Read {
        /// Key to print
        key: Option<String>,
    },
    /// Persist a JSON object read from a file or stdin
    Write {
        /// Read the object from FILE instead of stdin
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Replace the value of one key
    Set {
        /// Key to replace
        key: String,
        /// New value as JSON text
        value: String,
    },
    /// Print the category buckets and ownership diagnostics
    Classify,
}
