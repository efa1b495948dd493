//! split-json - inspect and edit split JSON directories.
//!
//! Commands:
//! - `split-json read [KEY]`: print the resolved record or one key
//! - `split-json write [--file FILE]`: persist a JSON object from FILE or stdin
//! - `split-json set KEY JSON`: replace one key and write the record back
//! - `split-json classify`: print category buckets and diagnostics
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use tracing_subscriber::EnvFilter;

use split_json_cli::{commands, Cli};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("split_json=debug,split_json_cli=debug,split_json_adapter=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let result = commands::run(&cli, &mut std::io::stdin().lock(), &mut std::io::stdout().lock());
    std::process::exit(result_to_exit(result));
}

/// Convert a command result to an exit code.
fn result_to_exit(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
