//! Shared types used across pipeline stages.
//!
//! The generate stage produces one content document per language; the render
//! stage consumes them read-only. Both sides address individual explanations
//! through [`ConceptKey`] composites, so the key construction lives here and
//! nowhere else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::naming::safe_name;

/// Composite key identifying one unit of generated content.
///
/// The composite form is `{category}_{subconcept}` with spaces, `?` and `/`
/// in the subconcept replaced by underscores. Content documents, page slugs
/// and cache lookups all derive from this one spelling, so it must stay
/// byte-stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptKey {
    pub category: String,
    pub subconcept: String,
}

impl ConceptKey {
    pub fn new(category: impl Into<String>, subconcept: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subconcept: subconcept.into(),
        }
    }

    /// The composite form used as a content-document key.
    ///
    /// `("Datatypes", "Primitive types")` → `"Datatypes_Primitive_types"`.
    pub fn composite(&self) -> String {
        let sanitized: String = self
            .subconcept
            .chars()
            .map(|c| match c {
                ' ' | '?' | '/' => '_',
                other => other,
            })
            .collect();
        format!("{}_{}", self.category, sanitized)
    }
}

/// Per-language document mapping composite concept keys to generated
/// markdown text. Persisted as pretty-printed JSON named by the language's
/// safe identifier, e.g. `content-autogen/gpt_3_5_turbo/Python_3_10.json`.
#[derive(Debug, Clone, Default)]
pub struct ContentDoc {
    entries: BTreeMap<String, String>,
}

impl ContentDoc {
    /// Path of the content document for a language.
    pub fn path(content_dir: &Path, language: &str) -> PathBuf {
        content_dir.join(format!("{}.json", safe_name(language)))
    }

    /// Load a language's content document. A missing file is an empty
    /// document (nothing generated yet); a malformed one propagates.
    pub fn load(content_dir: &Path, language: &str) -> Result<Self, ContentDocError> {
        let path = Self::path(content_dir, language);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(ContentDocError::Io(e)),
        };
        let entries = serde_json::from_str(&raw)?;
        Ok(Self { entries })
    }

    /// Persist the document, creating the content directory if needed.
    /// Whole-file overwrite.
    pub fn save(&self, content_dir: &Path, language: &str) -> Result<(), ContentDocError> {
        fs::create_dir_all(content_dir)?;
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(Self::path(content_dir, language), json)?;
        Ok(())
    }

    pub fn get(&self, composite: &str) -> Option<&str> {
        self.entries.get(composite).map(String::as_str)
    }

    pub fn insert(&mut self, composite: String, text: String) {
        self.entries.insert(composite, text);
    }

    pub fn contains(&self, composite: &str) -> bool {
        self.entries.contains_key(composite)
    }

    /// Iterate entries in key order (BTreeMap, so deterministic).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentDocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
