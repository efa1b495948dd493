//! Detection of the secondary scripting dialect.
//!
//! `.ts` modules are transpiled by an external `esbuild` executable. The probe
//! runs once when an adapter is constructed and its result is passed to the
//! classifier as a plain flag.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an explicit `esbuild` executable.
pub const ESBUILD_ENV: &str = "SPLIT_JSON_ESBUILD";

/// Name of the transpiler looked up on `PATH`.
pub const ESBUILD_BINARY: &str = "esbuild";

/// How the secondary dialect is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicScripts {
    /// Enabled when the probe finds a transpiler.
    #[default]
    Auto,
    /// Requested; falls back to disabled with a warning when the probe fails.
    Enabled,
    /// `.ts` files are never classified.
    Disabled,
}

/// Result of probing the host for optional tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    transpiler: Option<PathBuf>,
}

impl Capabilities {
    /// Look for a transpiler, first at `$SPLIT_JSON_ESBUILD`, then on `PATH`.
    ///
    /// Never fails; a missing transpiler only disables the dynamic categories.
    pub fn probe() -> Self {
        let transpiler = std::env::var_os(ESBUILD_ENV)
            .map(PathBuf::from)
            .filter(|path| path.is_file())
            .or_else(|| which::which(ESBUILD_BINARY).ok());

        match &transpiler {
            Some(path) => tracing::debug!("TypeScript modules enabled via '{}'", path.display()),
            None => tracing::debug!("No TypeScript transpiler found, .ts files are ignored"),
        }

        Self { transpiler }
    }

    /// Capabilities with nothing available.
    pub fn none() -> Self {
        Self::default()
    }

    /// Path of the transpiler, when found.
    pub fn transpiler(&self) -> Option<&PathBuf> {
        self.transpiler.as_ref()
    }

    /// Whether the dynamic categories can be populated.
    pub fn dynamic_scripts(&self) -> bool {
        self.transpiler.is_some()
    }
}
