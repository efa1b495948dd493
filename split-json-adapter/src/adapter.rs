//! The split JSON storage adapter.
//!
//! Every call re-scans the directory: classification, validation and key
//! merging are never cached, so the files on disk are the only state.

use crate::classifier::{Classifier, FileKeys};
use crate::codec::Codec;
use crate::error::{json_type_name, AdapterError, Result};
use crate::module_source::ModuleSource;
use crate::options::AdapterOptions;
use crate::probe::{Capabilities, DynamicScripts};
use crate::resolver::Resolver;
use crate::router::{Router, WriteSummary};
use crate::typescript::TypeScriptModuleSource;
use crate::validator::{validate, Diagnostic};
use crate::Record;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// The read/write seam consumed by a record-store library.
pub trait StorageAdapter {
    /// Produce the whole record.
    fn read(&self) -> Result<Record>;

    /// Persist every key of `data`.
    fn write(&self, data: &Record) -> Result<()>;
}

/// Buckets and ownership diagnostics for the current directory contents.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub keys: FileKeys,
    pub diagnostics: Vec<Diagnostic>,
}

/// Storage adapter keeping one file per top-level key in a directory.
pub struct SplitJsonAdapter {
    directory: PathBuf,
    defaults: Record,
    codec: Arc<dyn Codec>,
    scripts: Arc<dyn ModuleSource>,
    dynamic_source: Option<Arc<dyn ModuleSource>>,
    classifier: Classifier,
}

impl SplitJsonAdapter {
    /// Create an adapter over `directory`.
    ///
    /// Fails when the default value is not a JSON object. The directory is
    /// not touched until the first call.
    pub fn new(directory: impl Into<PathBuf>, options: AdapterOptions) -> Result<Self> {
        let defaults = match options.default_value {
            Value::Object(map) => map,
            other => {
                return Err(AdapterError::InvalidDefaultValue {
                    found: json_type_name(&other),
                })
            }
        };

        let dynamic_source = match options.dynamic_source {
            Some(source) => Some(source),
            None => probe_dynamic_source(options.dynamic_scripts),
        };

        Ok(Self {
            directory: directory.into(),
            defaults,
            codec: options.codec,
            scripts: options.scripts,
            classifier: Classifier::new(dynamic_source.is_some()),
            dynamic_source,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether `.ts` files are classified and loaded.
    pub fn dynamic_scripts_enabled(&self) -> bool {
        self.classifier.dynamic_scripts()
    }

    /// Resolve every key of the directory and the default value map.
    pub fn read(&self) -> Result<Record> {
        let keys = self.scan()?;
        self.report(&keys);
        debug!("Reading '{}'", self.directory.display());

        let dynamic_source = self
            .dynamic_source
            .as_deref()
            .map(|source| source as &dyn ModuleSource);

        Resolver::new(&self.directory, &*self.codec, &*self.scripts, &self.defaults)
            .with_dynamic_scripts(dynamic_source)
            .resolve(&keys)
    }

    /// Persist every key of `data`. Read-only keys are skipped silently.
    pub fn write(&self, data: &Record) -> Result<()> {
        self.write_with_summary(data).map(|_| ())
    }

    /// Like [`write`](Self::write), reporting which files were written.
    pub fn write_with_summary(&self, data: &Record) -> Result<WriteSummary> {
        let keys = self.scan()?;
        self.report(&keys);
        debug!(
            "Writing {} keys to '{}'",
            data.len(),
            self.directory.display()
        );

        Router::new(&self.directory, &*self.codec).write(&keys, data)
    }

    /// Persist a JSON value, which must be an object.
    pub fn write_value(&self, data: &Value) -> Result<()> {
        let record = data.as_object().ok_or(AdapterError::InvalidRecord {
            found: json_type_name(data),
        })?;
        self.write(record)
    }

    /// Classify the directory without loading anything.
    pub fn classify(&self) -> Result<Classification> {
        let keys = self.scan()?;
        let diagnostics = validate(&keys);
        Ok(Classification { keys, diagnostics })
    }

    fn scan(&self) -> Result<FileKeys> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|e| AdapterError::directory_creation(&self.directory, e))?;

        let mut keys = self.classifier.scan(&self.directory)?;
        keys.insert_defaults(&self.defaults);
        Ok(keys)
    }

    fn report(&self, keys: &FileKeys) {
        for diagnostic in validate(keys) {
            warn!("{}", diagnostic);
        }
    }
}

impl StorageAdapter for SplitJsonAdapter {
    fn read(&self) -> Result<Record> {
        SplitJsonAdapter::read(self)
    }

    fn write(&self, data: &Record) -> Result<()> {
        SplitJsonAdapter::write(self, data)
    }
}

impl std::fmt::Debug for SplitJsonAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitJsonAdapter")
            .field("directory", &self.directory)
            .field("defaults", &self.defaults)
            .field("dynamic_scripts", &self.dynamic_scripts_enabled())
            .finish_non_exhaustive()
    }
}

fn probe_dynamic_source(mode: DynamicScripts) -> Option<Arc<dyn ModuleSource>> {
    if mode == DynamicScripts::Disabled {
        return None;
    }

    let capabilities = Capabilities::probe();
    match capabilities.transpiler() {
        Some(esbuild) => Some(Arc::new(TypeScriptModuleSource::new(esbuild))),
        None => {
            if mode == DynamicScripts::Enabled {
                warn!("TypeScript modules requested but no transpiler was found, .ts files are ignored");
            }
            None
        }
    }
}
