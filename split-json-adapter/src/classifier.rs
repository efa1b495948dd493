//! Classification of directory entries into category buckets.
//!
//! Filenames are matched against an ordered rule table. The first rule whose
//! suffix ends the filename wins, so compound suffixes (`.template.json`)
//! are listed before the shorter suffixes they end with (`.json`).

use crate::category::{Category, DECLARATION_SUFFIX};
use crate::error::{AdapterError, Result};
use crate::Record;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// One entry of the classification table.
#[derive(Debug, Clone, Copy)]
struct SuffixRule {
    suffix: &'static str,
    /// `None` excludes the file from every bucket.
    category: Option<Category>,
    /// Rule is skipped unless the secondary dialect is available.
    requires_dynamic: bool,
}

impl SuffixRule {
    const fn exclude(suffix: &'static str) -> Self {
        Self {
            suffix,
            category: None,
            requires_dynamic: false,
        }
    }

    const fn bucket(suffix: &'static str, category: Category) -> Self {
        Self {
            suffix,
            category: Some(category),
            requires_dynamic: false,
        }
    }

    const fn dynamic(suffix: &'static str, category: Category) -> Self {
        Self {
            suffix,
            category: Some(category),
            requires_dynamic: true,
        }
    }
}

const RULES: &[SuffixRule] = &[
    SuffixRule::exclude(DECLARATION_SUFFIX),
    SuffixRule::bucket(".template.json", Category::Template),
    SuffixRule::bucket(".snapshot.json", Category::Snapshot),
    SuffixRule::bucket(".json", Category::Existing),
    SuffixRule::dynamic(".template.ts", Category::DynamicScriptTemplate),
    SuffixRule::bucket(".template.js", Category::ScriptTemplate),
    SuffixRule::dynamic(".ts", Category::DynamicScript),
    SuffixRule::bucket(".js", Category::Script),
];

/// Keys found for each category, one bucket per [`Category`].
///
/// A key may appear in several buckets; the resolver and the router decide
/// which one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileKeys {
    buckets: [BTreeSet<String>; 8],
}

impl FileKeys {
    /// Create an empty set of buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` to the bucket of `category`.
    pub fn insert(&mut self, category: Category, key: impl Into<String>) -> bool {
        self.buckets[category.index()].insert(key.into())
    }

    /// Fill the [`Category::Default`] bucket from the keys of a default value map.
    pub fn insert_defaults(&mut self, defaults: &Record) {
        for key in defaults.keys() {
            self.insert(Category::Default, key.as_str());
        }
    }

    /// Keys in the bucket of `category`.
    pub fn bucket(&self, category: Category) -> &BTreeSet<String> {
        &self.buckets[category.index()]
    }

    /// Whether `key` is in the bucket of `category`.
    pub fn contains(&self, category: Category, key: &str) -> bool {
        self.bucket(category).contains(key)
    }

    /// Whether `key` is in any of `categories`.
    pub fn contains_any(&self, categories: &[Category], key: &str) -> bool {
        categories.iter().any(|c| self.contains(*c, key))
    }

    /// Every category that holds `key`, in declaration order.
    pub fn categories_of(&self, key: &str) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.contains(*c, key))
            .collect()
    }

    /// Union of every bucket: the span of keys considered by `read`.
    pub fn universe(&self) -> BTreeSet<String> {
        self.buckets.iter().flatten().cloned().collect()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(BTreeSet::is_empty)
    }
}

impl Serialize for FileKeys {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for category in Category::ALL {
            map.serialize_entry(&category, self.bucket(category))?;
        }
        map.end()
    }
}

/// Assigns filenames to category buckets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    dynamic_scripts: bool,
}

impl Classifier {
    /// Create a classifier. `dynamic_scripts` is the result of the capability
    /// probe; without it `.ts` files are left unclassified.
    pub fn new(dynamic_scripts: bool) -> Self {
        Self { dynamic_scripts }
    }

    /// Whether the dynamic categories are populated.
    pub fn dynamic_scripts(&self) -> bool {
        self.dynamic_scripts
    }

    /// Classify a single filename.
    ///
    /// Returns the category and the logical key, or `None` when the file is
    /// excluded or matches no rule. A file whose key would be empty is ignored.
    pub fn classify_name<'a>(&self, file_name: &'a str) -> Option<(Category, &'a str)> {
        for rule in RULES {
            if rule.requires_dynamic && !self.dynamic_scripts {
                continue;
            }
            if let Some(key) = file_name.strip_suffix(rule.suffix) {
                let category = rule.category?;
                if key.is_empty() {
                    return None;
                }
                return Some((category, key));
            }
        }
        None
    }

    /// Classify every file directly inside `dir`.
    ///
    /// Sub-directories are skipped. The [`Category::Default`] bucket is left
    /// empty; it does not come from the filesystem.
    pub fn scan(&self, dir: &Path) -> Result<FileKeys> {
        let mut keys = FileKeys::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| AdapterError::directory_read(dir, e.into()))?;
            if entry.path().is_dir() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                tracing::trace!("Skipping non UTF-8 file name '{}'", entry.path().display());
                continue;
            };

            match self.classify_name(file_name) {
                Some((category, key)) => {
                    tracing::trace!("Classified '{}' as {} key '{}'", file_name, category, key);
                    keys.insert(category, key);
                }
                None => {
                    tracing::trace!("Ignoring '{}'", file_name);
                }
            }
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compound_suffixes_win_over_plain_json() {
        let classifier = Classifier::new(false);
        assert_eq!(
            classifier.classify_name("tags.template.json"),
            Some((Category::Template, "tags"))
        );
        assert_eq!(
            classifier.classify_name("tags.snapshot.json"),
            Some((Category::Snapshot, "tags"))
        );
        assert_eq!(
            classifier.classify_name("user.json"),
            Some((Category::Existing, "user"))
        );
    }

    #[test]
    fn test_scripts() {
        let classifier = Classifier::new(false);
        assert_eq!(
            classifier.classify_name("price.template.js"),
            Some((Category::ScriptTemplate, "price"))
        );
        assert_eq!(
            classifier.classify_name("clock.js"),
            Some((Category::Script, "clock"))
        );
    }

    #[test]
    fn test_dynamic_scripts_invisible_without_probe() {
        let classifier = Classifier::new(false);
        assert_eq!(classifier.classify_name("clock.ts"), None);
        assert_eq!(classifier.classify_name("price.template.ts"), None);
    }

    #[test]
    fn test_dynamic_scripts_with_probe() {
        let classifier = Classifier::new(true);
        assert_eq!(
            classifier.classify_name("clock.ts"),
            Some((Category::DynamicScript, "clock"))
        );
        assert_eq!(
            classifier.classify_name("price.template.ts"),
            Some((Category::DynamicScriptTemplate, "price"))
        );
    }

    #[test]
    fn test_declaration_files_always_excluded() {
        for dynamic in [false, true] {
            let classifier = Classifier::new(dynamic);
            assert_eq!(classifier.classify_name("index.d.ts"), None);
            assert_eq!(classifier.classify_name("user.template.d.ts"), None);
        }
    }

    #[test]
    fn test_unrelated_and_empty_names_ignored() {
        let classifier = Classifier::new(true);
        assert_eq!(classifier.classify_name("README.md"), None);
        assert_eq!(classifier.classify_name("user.json.bak"), None);
        assert_eq!(classifier.classify_name(".json"), None);
        assert_eq!(classifier.classify_name(".template.json"), None);
    }

    #[test]
    fn test_suffix_stripping_is_reversible() {
        let classifier = Classifier::new(true);
        let names = [
            "a.json",
            "a.b.json",
            "x.template.json",
            "x.snapshot.json",
            "x.template.snapshot.json",
            "s.js",
            "s.template.js",
            "d.ts",
            "d.template.ts",
            "weird.snapshot.template.json",
        ];
        for name in names {
            let (category, key) = classifier.classify_name(name).unwrap();
            assert_eq!(category.file_name(key).unwrap(), name);
        }
    }

    #[test]
    fn test_scan_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("user.json"), "{}").unwrap();
        fs::write(dir.join("tags.template.json"), "[]").unwrap();
        fs::write(dir.join("tags.snapshot.json"), "[]").unwrap();
        fs::write(dir.join("clock.js"), "module.exports = 1").unwrap();
        fs::write(dir.join("clock.d.ts"), "export {}").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.join("nested.json")).unwrap();

        let keys = Classifier::new(false).scan(dir).unwrap();

        assert!(keys.contains(Category::Existing, "user"));
        assert!(keys.contains(Category::Template, "tags"));
        assert!(keys.contains(Category::Snapshot, "tags"));
        assert!(keys.contains(Category::Script, "clock"));
        assert!(!keys.contains(Category::Existing, "nested"));
        assert_eq!(
            keys.universe().into_iter().collect::<Vec<_>>(),
            vec!["clock", "tags", "user"]
        );
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Classifier::new(false).scan(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(AdapterError::DirectoryRead { .. })));
    }

    #[test]
    fn test_universe_includes_defaults() {
        let mut keys = FileKeys::new();
        keys.insert(Category::Existing, "user");
        let defaults = json!({"session": [], "user": {}});
        keys.insert_defaults(defaults.as_object().unwrap());

        let universe = keys.universe();
        assert_eq!(universe.len(), 2);
        assert!(universe.contains("session"));
        assert_eq!(
            keys.categories_of("user"),
            vec![Category::Default, Category::Existing]
        );
    }

    #[test]
    fn test_file_keys_serialize_as_map() {
        let mut keys = FileKeys::new();
        keys.insert(Category::Snapshot, "tags");
        let value = serde_json::to_value(&keys).unwrap();
        assert_eq!(value["snapshot"], json!(["tags"]));
        assert_eq!(value["existing"], json!([]));
    }
}
