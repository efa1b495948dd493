//! Primary-script module source backed by QuickJS.
//!
//! Modules are CommonJS: the file assigns `module.exports` (or properties of
//! `exports`) and that value is the default export. An ES-module interop
//! object (`__esModule` with a `default` property) yields its `default`.
//!
//! `require` resolves relative requests (`./x`, `../x`) against the module's
//! directory, trying the exact name, then `.js`, then `.json`. Package names
//! are not resolved.

use crate::category::SCRIPT_EXTENSION;
use crate::error::{AdapterError, Result};
use crate::module_source::ModuleSource;
use rquickjs::{CatchResultExt, CaughtError, Context, Ctx, Function, Runtime};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Memory available to one module evaluation.
const MEMORY_LIMIT: usize = 64 * 1024 * 1024;

/// Stack available to one module evaluation.
const MAX_STACK_SIZE: usize = 512 * 1024;

/// Evaluates `.js` modules in a fresh QuickJS runtime per load.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickJsModuleSource;

impl QuickJsModuleSource {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate module `source` as if it were the content of `path`.
    pub fn evaluate(&self, path: &Path, source: &str) -> Result<serde_json::Value> {
        let rt = Runtime::new()
            .map_err(|e| AdapterError::script(path, format!("failed to create runtime: {}", e)))?;
        rt.set_memory_limit(MEMORY_LIMIT);
        rt.set_max_stack_size(MAX_STACK_SIZE);

        let ctx = Context::full(&rt)
            .map_err(|e| AdapterError::script(path, format!("failed to create context: {}", e)))?;

        let wrapped = wrap_module(path, source);

        ctx.with(|ctx| {
            install_host_functions(&ctx).map_err(|e| {
                AdapterError::script(path, format!("failed to install host functions: {}", e))
            })?;

            let exported: rquickjs::Value = ctx
                .eval(wrapped.as_bytes())
                .catch(&ctx)
                .map_err(|e| AdapterError::script(path, describe(e)))?;

            if exported.is_undefined() || exported.is_null() || exported.is_function() {
                return Ok(serde_json::Value::Null);
            }

            let text = ctx
                .json_stringify(exported)
                .catch(&ctx)
                .map_err(|e| AdapterError::script(path, describe(e)))?;

            match text {
                Some(js_string) => {
                    let text = js_string.to_string().map_err(|e| {
                        AdapterError::script(path, format!("string conversion failed: {}", e))
                    })?;
                    serde_json::from_str(&text).map_err(|e| {
                        AdapterError::script(path, format!("export is not valid JSON: {}", e))
                    })
                }
                // Symbols and other values JSON cannot represent.
                None => Ok(serde_json::Value::Null),
            }
        })
    }
}

impl ModuleSource for QuickJsModuleSource {
    fn load(&self, path: &Path) -> Result<serde_json::Value> {
        let source =
            std::fs::read_to_string(path).map_err(|e| AdapterError::file_read(path, e))?;
        tracing::trace!("Evaluating module '{}'", path.display());
        self.evaluate(path, &source)
    }
}

fn install_host_functions(ctx: &Ctx<'_>) -> rquickjs::Result<()> {
    let globals = ctx.globals();
    globals.set("__hostResolve", Function::new(ctx.clone(), resolve_request)?)?;
    globals.set("__hostReadFile", Function::new(ctx.clone(), read_module_file)?)?;
    globals.set("__hostDirname", Function::new(ctx.clone(), module_dirname)?)?;
    Ok(())
}

/// Resolve a relative `require` request against `dir`.
fn resolve_request(dir: String, request: String) -> Option<String> {
    if !(request.starts_with("./") || request.starts_with("../")) {
        return None;
    }

    let base = Path::new(&dir).join(&request);
    let with_extension = |extension: &str| {
        let mut name = OsString::from(base.as_os_str());
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    };

    [base.clone(), with_extension(SCRIPT_EXTENSION), with_extension("json")]
        .into_iter()
        .find(|candidate| candidate.is_file())
        .map(|found| found.to_string_lossy().into_owned())
}

fn read_module_file(path: String) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn module_dirname(path: String) -> String {
    Path::new(&path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Wrap CommonJS source in a function that returns the default export.
fn wrap_module(path: &Path, source: &str) -> String {
    let filename = path.to_string_lossy();
    let dirname = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    // JSON string literals are valid JS string literals.
    let filename = serde_json::Value::String(filename.into_owned()).to_string();
    let dirname = serde_json::Value::String(dirname).to_string();

    format!(
        r#"(function () {{
var cache = {{}};
function load(filename) {{
    if (Object.prototype.hasOwnProperty.call(cache, filename)) {{
        return cache[filename].exports;
    }}
    var text = __hostReadFile(filename);
    if (text === undefined || text === null) {{
        throw new Error("Cannot read module '" + filename + "'");
    }}
    var module = {{ exports: {{}} }};
    cache[filename] = module;
    if (/\.json$/.test(filename)) {{
        module.exports = JSON.parse(text);
    }} else {{
        var dirname = __hostDirname(filename);
        new Function("module", "exports", "require", "__filename", "__dirname", text)(
            module, module.exports, makeRequire(dirname), filename, dirname);
    }}
    return module.exports;
}}
function makeRequire(dirname) {{
    return function require(request) {{
        var resolved = __hostResolve(dirname, String(request));
        if (resolved === undefined || resolved === null) {{
            throw new Error("Cannot find module '" + request + "'");
        }}
        return load(resolved);
    }};
}}
var module = {{ exports: {{}} }};
cache[{filename}] = module;
(function (module, exports, require, __filename, __dirname) {{
{source}
}})(module, module.exports, makeRequire({dirname}), {filename}, {dirname});
var m = module.exports;
if (m !== null && typeof m === "object" && m.__esModule && Object.prototype.hasOwnProperty.call(m, "default")) {{
    return m["default"];
}}
return m;
}})()"#
    )
}

fn describe(error: CaughtError<'_>) -> String {
    match error {
        CaughtError::Exception(ex) => format!("JS error: {}", ex),
        CaughtError::Value(v) => {
            let s: std::result::Result<String, _> = v.get();
            format!("JS threw: {}", s.unwrap_or_else(|_| "unknown".to_string()))
        }
        CaughtError::Error(e) => format!("Error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn eval(source: &str) -> Result<serde_json::Value> {
        QuickJsModuleSource::new().evaluate(Path::new("/data/mod.js"), source)
    }

    #[test]
    fn test_module_exports_object() {
        let value = eval("module.exports = { price: 10 * 2, tags: ['a'] };").unwrap();
        assert_eq!(value, json!({"price": 20, "tags": ["a"]}));
    }

    #[test]
    fn test_exports_properties() {
        let value = eval("exports.a = 1; exports.b = 'two';").unwrap();
        assert_eq!(value, json!({"a": 1, "b": "two"}));
    }

    #[test]
    fn test_es_module_interop_default() {
        let value = eval(
            "Object.defineProperty(exports, '__esModule', { value: true }); exports.default = [1, 2];",
        )
        .unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn test_functions_are_stripped() {
        let value = eval("module.exports = { n: 1, f: function () {} };").unwrap();
        assert_eq!(value, json!({"n": 1}));
    }

    #[test]
    fn test_function_export_becomes_null() {
        assert_eq!(eval("module.exports = function () {};").unwrap(), json!(null));
    }

    #[test]
    fn test_trailing_line_comment() {
        let value = eval("module.exports = 3 // three").unwrap();
        assert_eq!(value, json!(3));
    }

    #[test]
    fn test_filename_is_available() {
        let value = eval("module.exports = __filename;").unwrap();
        assert_eq!(value, json!("/data/mod.js"));
    }

    #[test]
    fn test_cycle_is_an_error() {
        let result = eval("var a = {}; a.self = a; module.exports = a;");
        assert!(matches!(result, Err(AdapterError::Script { .. })));
    }

    #[test]
    fn test_throw_is_an_error() {
        let err = eval("throw new Error('boom');").unwrap_err();
        assert!(err.to_string().contains("boom"), "got: {}", err);
    }

    #[test]
    fn test_syntax_error() {
        assert!(eval("module.exports = {").is_err());
    }

    #[test]
    fn test_load_reads_fresh_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clock.js");
        let source = QuickJsModuleSource::new();

        fs::write(&path, "module.exports = { tick: 1 };").unwrap();
        assert_eq!(source.load(&path).unwrap(), json!({"tick": 1}));

        fs::write(&path, "module.exports = { tick: 2 };").unwrap();
        assert_eq!(source.load(&path).unwrap(), json!({"tick": 2}));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = QuickJsModuleSource::new().load(&temp_dir.path().join("nope.js"));
        assert!(matches!(result, Err(AdapterError::FileRead { .. })));
    }

    #[test]
    fn test_require_relative_json_and_js() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::create_dir(dir.join("lib")).unwrap();
        fs::write(dir.join("lib").join("rates.json"), r#"{"eur": 2}"#).unwrap();
        fs::write(
            dir.join("lib").join("convert.js"),
            "var rates = require('./rates.json'); module.exports = function (n) { return n * rates.eur; };",
        )
        .unwrap();
        let main = dir.join("prices.js");
        fs::write(
            &main,
            "var convert = require('./lib/convert'); module.exports = { total: convert(21) };",
        )
        .unwrap();

        let value = QuickJsModuleSource::new().load(&main).unwrap();
        assert_eq!(value, json!({"total": 42}));
    }

    #[test]
    fn test_require_sees_fresh_content() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let main = dir.join("main.js");
        fs::write(&main, "module.exports = require('./data.json');").unwrap();
        let source = QuickJsModuleSource::new();

        fs::write(dir.join("data.json"), "1").unwrap();
        assert_eq!(source.load(&main).unwrap(), json!(1));
        fs::write(dir.join("data.json"), "2").unwrap();
        assert_eq!(source.load(&main).unwrap(), json!(2));
    }

    #[test]
    fn test_require_missing_or_package_module_fails() {
        let temp_dir = TempDir::new().unwrap();
        let main = temp_dir.path().join("main.js");

        fs::write(&main, "module.exports = require('./absent');").unwrap();
        let err = QuickJsModuleSource::new().load(&main).unwrap_err();
        assert!(err.to_string().contains("Cannot find module"), "got: {}", err);

        fs::write(&main, "module.exports = require('lodash');").unwrap();
        let err = QuickJsModuleSource::new().load(&main).unwrap_err();
        assert!(err.to_string().contains("Cannot find module"), "got: {}", err);
    }
}
