//! Write routing: deciding where each key of a record is persisted.

use crate::category::Category;
use crate::classifier::{Classifier, FileKeys};
use crate::codec::Codec;
use crate::error::{AdapterError, Result};
use crate::Record;
use serde::Serialize;
use std::path::{Path, PathBuf};

const READ_ONLY: [Category; 2] = [Category::Script, Category::DynamicScript];

const COPY_ON_WRITE: [Category; 3] = [
    Category::Template,
    Category::ScriptTemplate,
    Category::DynamicScriptTemplate,
];

/// Destination of one key on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteTarget {
    /// Backed by a code module; nothing is written.
    ReadOnly,
    /// Backed by a template; written to `<key>.snapshot.json`.
    Snapshot,
    /// Written to `<key>.json`.
    Primary,
}

impl WriteTarget {
    /// Category of the file that receives the value.
    pub fn category(self) -> Option<Category> {
        match self {
            WriteTarget::ReadOnly => None,
            WriteTarget::Snapshot => Some(Category::Snapshot),
            WriteTarget::Primary => Some(Category::Existing),
        }
    }

    /// Name of the file that receives the value of `key`.
    pub fn file_name(self, key: &str) -> Option<String> {
        self.category().and_then(|c| c.file_name(key))
    }
}

/// Where `key` is written given the current classification.
pub fn route(keys: &FileKeys, key: &str) -> WriteTarget {
    if keys.contains_any(&READ_ONLY, key) {
        WriteTarget::ReadOnly
    } else if keys.contains_any(&COPY_ON_WRITE, key) {
        WriteTarget::Snapshot
    } else {
        WriteTarget::Primary
    }
}

/// What a write pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Files written, in key order.
    pub written: Vec<PathBuf>,
    /// Keys skipped because they are read-only.
    pub skipped: Vec<String>,
}

/// Persists records into a classified directory.
pub struct Router<'a> {
    directory: &'a Path,
    codec: &'a dyn Codec,
}

impl<'a> Router<'a> {
    pub fn new(directory: &'a Path, codec: &'a dyn Codec) -> Self {
        Self { directory, codec }
    }

    /// Write every key of `data`. Keys are independent: a failure stops the
    /// pass but leaves earlier writes in place. Keys that cannot be stored
    /// are rejected before anything is written.
    pub fn write(&self, keys: &FileKeys, data: &Record) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();
        let mut pending = Vec::with_capacity(data.len());

        for (key, value) in data {
            match target_file_name(route(keys, key), key)? {
                Some(file_name) => pending.push((key, value, file_name)),
                None => {
                    tracing::debug!("Skipping read-only key '{}'", key);
                    summary.skipped.push(key.clone());
                }
            }
        }

        for (key, value, file_name) in pending {
            let text = self.codec.serialize(value).map_err(|e| AdapterError::Encode {
                key: key.clone(),
                source: e,
            })?;
            let path = self.directory.join(file_name);
            std::fs::write(&path, text).map_err(|e| AdapterError::file_write(&path, e))?;

            tracing::debug!("Wrote '{}' to '{}'", key, path.display());
            summary.written.push(path);
        }

        Ok(summary)
    }
}

/// File receiving `key` for `target`, `None` when the key is read-only.
///
/// The name must stay inside the data directory and classify back to the
/// same category and key, otherwise the value would be lost on next read.
fn target_file_name(target: WriteTarget, key: &str) -> Result<Option<String>> {
    let Some(category) = target.category() else {
        return Ok(None);
    };

    if key.is_empty() {
        return Err(AdapterError::invalid_key(key, "key is empty"));
    }
    if key.contains(['/', '\\']) {
        return Err(AdapterError::invalid_key(key, "key contains a path separator"));
    }
    if key == ".." {
        return Err(AdapterError::invalid_key(key, "key is a parent directory reference"));
    }

    let file_name = category
        .file_name(key)
        .ok_or_else(|| AdapterError::invalid_key(key, "key has no file form"))?;
    match Classifier::default().classify_name(&file_name) {
        Some((c, k)) if c == category && k == key => Ok(Some(file_name)),
        _ => Err(AdapterError::invalid_key(
            key,
            "file name would be read back as a different key",
        )),
    }
}
