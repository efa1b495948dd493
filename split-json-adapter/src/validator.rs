//! Ownership checks over classified keys.
//!
//! A key backed by more than one authoritative file is ambiguous. Resolution
//! still picks a winner deterministically, so these checks only report.

use crate::category::Category;
use crate::classifier::FileKeys;
use serde::Serialize;

/// Kind of ambiguity found for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A plain data file and a template both exist for the key.
    TemplateAndData,
    /// Two template forms exist; the more expressive one is used.
    ShadowedTemplate,
}

/// A non-fatal finding about a key's ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub key: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

const TEMPLATES: [Category; 3] = [
    Category::DynamicScriptTemplate,
    Category::ScriptTemplate,
    Category::Template,
];

/// Inspect `keys` for ambiguous ownership.
pub fn validate(keys: &FileKeys) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for key in keys.bucket(Category::Existing) {
        if keys.contains_any(&TEMPLATES, key) {
            diagnostics.push(Diagnostic {
                kind: DiagnosticKind::TemplateAndData,
                key: key.clone(),
                message: format!(
                    "Data may be corrupted, {} presented in both template and data, remove one of them",
                    key
                ),
            });
        }
    }

    // TEMPLATES is ordered by read precedence, so each template form can
    // only shadow the ones after it.
    for (i, winner) in TEMPLATES.iter().enumerate() {
        for key in keys.bucket(*winner) {
            for shadowed in &TEMPLATES[i + 1..] {
                if keys.contains(*shadowed, key) {
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::ShadowedTemplate,
                        key: key.clone(),
                        message: format!(
                            "Data may be corrupted, {} presented in both {} and {}, {} will be used",
                            key,
                            describe(*shadowed),
                            describe(*winner),
                            describe(*winner)
                        ),
                    });
                }
            }
        }
    }

    diagnostics
}

fn describe(category: Category) -> &'static str {
    match category {
        Category::Template => "json template",
        Category::ScriptTemplate => "js template",
        Category::DynamicScriptTemplate => "ts template",
        _ => "data",
    }
}
