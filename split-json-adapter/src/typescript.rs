//! Secondary-dialect module source: TypeScript through `esbuild`.
//!
//! The file is transpiled to CommonJS and the output is evaluated by the
//! primary engine, so both dialects share export and normalization rules.

use crate::error::{AdapterError, Result};
use crate::module_source::ModuleSource;
use crate::quickjs::QuickJsModuleSource;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Loads `.ts` modules by transpiling them with `esbuild`.
#[derive(Debug, Clone)]
pub struct TypeScriptModuleSource {
    esbuild: PathBuf,
    engine: QuickJsModuleSource,
}

impl TypeScriptModuleSource {
    /// Use the `esbuild` executable at `esbuild`.
    pub fn new(esbuild: impl Into<PathBuf>) -> Self {
        Self {
            esbuild: esbuild.into(),
            engine: QuickJsModuleSource::new(),
        }
    }

    /// Transpile `path` to CommonJS source.
    pub fn transpile(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.esbuild)
            .arg(path)
            .arg("--format=cjs")
            .arg("--platform=neutral")
            .arg("--log-level=error")
            .output()
            .map_err(|e| {
                AdapterError::transpile(
                    path,
                    format!("failed to run '{}': {}", self.esbuild.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::transpile(path, stderr.trim().to_string()));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| AdapterError::transpile(path, format!("output is not UTF-8: {}", e)))
    }
}

impl ModuleSource for TypeScriptModuleSource {
    fn load(&self, path: &Path) -> Result<serde_json::Value> {
        tracing::trace!("Transpiling module '{}'", path.display());
        let source = self.transpile(path)?;
        self.engine.evaluate(path, &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_missing_transpiler_is_a_transpile_error() {
        let temp_dir = TempDir::new().unwrap();
        let module = temp_dir.path().join("price.ts");
        std::fs::write(&module, "export default 1;").unwrap();

        let source = TypeScriptModuleSource::new(temp_dir.path().join("no-such-esbuild"));
        let result = source.load(&module);
        assert!(matches!(result, Err(AdapterError::Transpile { .. })));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_transpiler_output_is_evaluated() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        // Stand-in transpiler that prints fixed CommonJS output.
        let fake = temp_dir.path().join("esbuild");
        std::fs::write(
            &fake,
            "#!/bin/sh\necho 'module.exports = { transpiled: true };'\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let module = temp_dir.path().join("flags.ts");
        std::fs::write(&module, "export default { transpiled: true };").unwrap();

        let value = TypeScriptModuleSource::new(&fake).load(&module).unwrap();
        assert_eq!(value, serde_json::json!({"transpiled": true}));
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_transpiler_failure_carries_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let fake = temp_dir.path().join("esbuild");
        std::fs::write(&fake, "#!/bin/sh\necho 'Expected \";\"' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let module = temp_dir.path().join("broken.ts");
        std::fs::write(&module, "export default {").unwrap();

        let err = TypeScriptModuleSource::new(&fake).load(&module).unwrap_err();
        assert!(err.to_string().contains("Expected"), "got: {}", err);
    }
}
