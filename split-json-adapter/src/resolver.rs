//! Read resolution: picking one source per key and loading it.

use crate::category::Category;
use crate::classifier::FileKeys;
use crate::codec::Codec;
use crate::error::{AdapterError, Result};
use crate::module_source::{load_normalized, ModuleSource};
use crate::Record;
use serde_json::Value;
use std::path::Path;

/// Order in which categories back a key on read, highest first.
///
/// Keys in none of these fall back to the default value map.
pub const READ_PRECEDENCE: [Category; 7] = [
    Category::DynamicScript,
    Category::Script,
    Category::Snapshot,
    Category::Existing,
    Category::DynamicScriptTemplate,
    Category::ScriptTemplate,
    Category::Template,
];

/// The category whose file backs `key` on read.
pub fn resolve_source(keys: &FileKeys, key: &str) -> Category {
    READ_PRECEDENCE
        .into_iter()
        .find(|category| keys.contains(*category, key))
        .unwrap_or(Category::Default)
}

/// Loads the value of every key in a classified directory.
pub struct Resolver<'a> {
    directory: &'a Path,
    codec: &'a dyn Codec,
    scripts: &'a dyn ModuleSource,
    dynamic_scripts: Option<&'a dyn ModuleSource>,
    defaults: &'a Record,
}

impl<'a> Resolver<'a> {
    pub fn new(
        directory: &'a Path,
        codec: &'a dyn Codec,
        scripts: &'a dyn ModuleSource,
        defaults: &'a Record,
    ) -> Self {
        Self {
            directory,
            codec,
            scripts,
            dynamic_scripts: None,
            defaults,
        }
    }

    /// Module source for the secondary dialect.
    pub fn with_dynamic_scripts(mut self, source: Option<&'a dyn ModuleSource>) -> Self {
        self.dynamic_scripts = source;
        self
    }

    /// Resolve every key in the universe of `keys`.
    pub fn resolve(&self, keys: &FileKeys) -> Result<Record> {
        let universe = keys.universe();
        tracing::debug!("Resolving {} keys", universe.len());

        let mut record = Record::new();
        for key in universe {
            let value = self.resolve_key(keys, &key)?;
            record.insert(key, value);
        }
        Ok(record)
    }

    /// Resolve a single key.
    pub fn resolve_key(&self, keys: &FileKeys, key: &str) -> Result<Value> {
        let category = resolve_source(keys, key);
        tracing::trace!("Resolving '{}' from {}", key, category);
        self.load(category, key)
    }

    fn load(&self, category: Category, key: &str) -> Result<Value> {
        let Some(file_name) = category.file_name(key) else {
            return Ok(self.defaults.get(key).cloned().unwrap_or(Value::Null));
        };
        let path = self.directory.join(file_name);

        if category.is_dynamic() {
            let source = self.dynamic_scripts.ok_or_else(|| {
                AdapterError::script(&path, "TypeScript modules are not enabled")
            })?;
            load_normalized(source, self.codec, &path)
        } else if category.is_module() {
            load_normalized(self.scripts, self.codec, &path)
        } else {
            read_data_file(&path, self.codec)
        }
    }
}

/// Read and decode a plain data file.
pub(crate) fn read_data_file(path: &Path, codec: &dyn Codec) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| AdapterError::file_read(path, e))?;
    codec.deserialize(&text).map_err(|e| AdapterError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}
