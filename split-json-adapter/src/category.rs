//! Categories a key can be backed by, and the file naming of each.

use serde::Serialize;

/// Extension of primary-script modules.
pub const SCRIPT_EXTENSION: &str = "js";

/// Extension of secondary-dialect modules, only visible when the dialect is available.
pub const DYNAMIC_SCRIPT_EXTENSION: &str = "ts";

/// Declaration-only files are never a data source.
pub const DECLARATION_SUFFIX: &str = ".d.ts";

/// Where a logical key's value can come from.
///
/// Every category except [`Category::Default`] corresponds to exactly one
/// filename suffix; the key is the filename with that suffix removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Declared by the default value map, no file involved.
    Default,
    /// `<key>.json`
    Existing,
    /// `<key>.template.json`
    Template,
    /// `<key>.js`, read-only.
    Script,
    /// `<key>.template.js`
    ScriptTemplate,
    /// `<key>.ts`, read-only.
    DynamicScript,
    /// `<key>.template.ts`
    DynamicScriptTemplate,
    /// `<key>.snapshot.json`, the materialized override of a template.
    Snapshot,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 8] = [
        Category::Default,
        Category::Existing,
        Category::Template,
        Category::Script,
        Category::ScriptTemplate,
        Category::DynamicScript,
        Category::DynamicScriptTemplate,
        Category::Snapshot,
    ];

    /// Filename suffix for this category, `None` for [`Category::Default`].
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Category::Default => None,
            Category::Existing => Some(".json"),
            Category::Template => Some(".template.json"),
            Category::Script => Some(".js"),
            Category::ScriptTemplate => Some(".template.js"),
            Category::DynamicScript => Some(".ts"),
            Category::DynamicScriptTemplate => Some(".template.ts"),
            Category::Snapshot => Some(".snapshot.json"),
        }
    }

    /// Reconstruct the filename backing `key` in this category.
    pub fn file_name(self, key: &str) -> Option<String> {
        self.suffix().map(|suffix| format!("{}{}", key, suffix))
    }

    /// Keys backed by code modules are never written.
    pub fn is_read_only(self) -> bool {
        matches!(self, Category::Script | Category::DynamicScript)
    }

    /// Templates are copy-on-write: writes land in a snapshot.
    pub fn is_template(self) -> bool {
        matches!(
            self,
            Category::Template | Category::ScriptTemplate | Category::DynamicScriptTemplate
        )
    }

    /// Whether the value is produced by executing a module.
    pub fn is_module(self) -> bool {
        matches!(
            self,
            Category::Script
                | Category::ScriptTemplate
                | Category::DynamicScript
                | Category::DynamicScriptTemplate
        )
    }

    /// Whether the category depends on the secondary dialect being available.
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            Category::DynamicScript | Category::DynamicScriptTemplate
        )
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Default => write!(f, "default"),
            Category::Existing => write!(f, "existing"),
            Category::Template => write!(f, "template"),
            Category::Script => write!(f, "script"),
            Category::ScriptTemplate => write!(f, "script_template"),
            Category::DynamicScript => write!(f, "dynamic_script"),
            Category::DynamicScriptTemplate => write!(f, "dynamic_script_template"),
            Category::Snapshot => write!(f, "snapshot"),
        }
    }
}
