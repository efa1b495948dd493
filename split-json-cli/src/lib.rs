//! Library half of the `split-json` binary.
//!
//! Command handlers take their input and output streams as parameters so
//! they can be driven from tests without spawning a process.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
