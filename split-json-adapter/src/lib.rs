//! Storage adapter that splits a JSON record across one file per key.
//!
//! Each top-level key of the record lives in its own file inside a single
//! directory. The filename suffix decides the role of the file:
//!
//! | Suffix           | Category                | Written to       |
//! |------------------|-------------------------|------------------|
//! | `.d.ts`          | ignored                 |                  |
//! | `.template.json` | template                | `.snapshot.json` |
//! | `.snapshot.json` | snapshot                | `.snapshot.json` |
//! | `.json`          | existing data           | `.json`          |
//! | `.template.ts`   | dynamic script template | `.snapshot.json` |
//! | `.template.js`   | script template         | `.snapshot.json` |
//! | `.ts`            | dynamic script          | never            |
//! | `.js`            | script                  | never            |
//!
//! `.ts` files are only considered when an `esbuild` executable is found.
//!
//! # Example
//!
//! ```no_run
//! use split_json_adapter::{AdapterOptions, SplitJsonAdapter};
//! use serde_json::json;
//!
//! let options = AdapterOptions::new().with_default_value(json!({"posts": []}));
//! let adapter = SplitJsonAdapter::new("db", options)?;
//!
//! let mut record = adapter.read()?;
//! record.insert("user".to_string(), json!({"id": 0, "money": 13}));
//! adapter.write(&record)?;
//! # Ok::<(), split_json_adapter::AdapterError>(())
//! ```

mod adapter;
mod category;
mod classifier;
mod codec;
mod config;
mod error;
mod module_source;
mod options;
mod probe;
mod quickjs;
mod resolver;
mod router;
mod typescript;
mod validator;

/// A resolved record: logical key to value.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub use adapter::{Classification, SplitJsonAdapter, StorageAdapter};
pub use category::{Category, DECLARATION_SUFFIX, DYNAMIC_SCRIPT_EXTENSION, SCRIPT_EXTENSION};
pub use classifier::{Classifier, FileKeys};
pub use codec::{Codec, FnCodec, JsonCodec, DEFAULT_INDENT};
pub use config::{AdapterConfig, ENV_PREFIX};
pub use error::{AdapterError, CodecError, Result};
pub use module_source::{load_normalized, ModuleSource};
pub use options::AdapterOptions;
pub use probe::{Capabilities, DynamicScripts, ESBUILD_BINARY, ESBUILD_ENV};
pub use quickjs::QuickJsModuleSource;
pub use resolver::{resolve_source, Resolver, READ_PRECEDENCE};
pub use router::{route, Router, WriteSummary, WriteTarget};
pub use typescript::TypeScriptModuleSource;
pub use validator::{validate, Diagnostic, DiagnosticKind};
