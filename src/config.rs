//! Declarative site configuration: languages and concept prompts.
//!
//! Two YAML documents drive a build:
//!
//! ```text
//! docs/
//! ├── prog_langs.yaml           # list of language display labels
//! └── prog_lang_concepts.yaml   # category → subconcept → prompt template
//! ```
//!
//! `prog_langs.yaml`:
//!
//! ```yaml
//! Programming Languages:
//!   - Python 3.10
//!   - Rust
//!   - C++
//! ```
//!
//! `prog_lang_concepts.yaml`:
//!
//! ```yaml
//! title: Language concept comparison   # optional, ignored
//! Datatypes:
//!   Primitives: Explain the primitive types in {lang} with examples.
//!   Collections: Explain the collection types in {lang} with examples.
//! Functions:
//!   Closures: Explain closures in {lang} with code examples.
//! ```
//!
//! Both documents are validated here, at a single point, into typed
//! structures. Malformed shapes (a category that is not a mapping, a prompt
//! that is not a string, a template without the `{lang}` placeholder) are
//! fatal load errors rather than surprises deep inside generation or
//! rendering.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::ConceptKey;

/// Placeholder substituted with the language display label when building
/// a concrete prompt.
pub const LANG_PLACEHOLDER: &str = "{lang}";

/// Top-level key of the languages document.
const LANGUAGES_KEY: &str = "Programming Languages";

/// Scalar metadata key in the concepts document that carries no prompts.
const TITLE_KEY: &str = "title";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing '{LANGUAGES_KEY}' key in {0}")]
    MissingLanguagesKey(String),
    #[error("'{LANGUAGES_KEY}' must be a list of strings in {0}")]
    BadLanguagesShape(String),
    #[error("category '{0}' must map subconcepts to prompt strings")]
    BadCategoryShape(String),
    #[error("prompt for '{0}' / '{1}' must be a string")]
    BadPromptShape(String, String),
    #[error("prompt for '{0}' / '{1}' is missing the {LANG_PLACEHOLDER} placeholder")]
    MissingPlaceholder(String, String),
}

/// Load the list of language display labels.
pub fn load_languages(path: &Path) -> Result<Vec<String>, ConfigError> {
    let raw = fs::read_to_string(path)?;
    let doc: serde_yaml::Value = serde_yaml::from_str(&raw)?;
    let display = path.display().to_string();
    let list = doc
        .get(LANGUAGES_KEY)
        .ok_or(ConfigError::MissingLanguagesKey(display.clone()))?;
    let entries = list
        .as_sequence()
        .ok_or(ConfigError::BadLanguagesShape(display.clone()))?;
    entries
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or(ConfigError::BadLanguagesShape(display.clone()))
        })
        .collect()
}

/// Validated, ordered concept definitions: category → subconcept → prompt
/// template. Read-only after load; the authoritative side of the staleness
/// check in [`crate::cache::PromptCache`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptSet {
    categories: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConceptSet {
    /// Load and validate the concepts document.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Parse and validate a concepts document from YAML text.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let doc: serde_yaml::Value = serde_yaml::from_str(raw)?;
        let mut categories = BTreeMap::new();

        let Some(mapping) = doc.as_mapping() else {
            return Err(ConfigError::BadCategoryShape("<document root>".into()));
        };
        for (key, value) in mapping {
            let Some(category) = key.as_str() else {
                return Err(ConfigError::BadCategoryShape(format!("{key:?}")));
            };
            // A scalar `title` entry is document metadata, not a category.
            if category == TITLE_KEY && !value.is_mapping() {
                continue;
            }
            let Some(subconcepts) = value.as_mapping() else {
                return Err(ConfigError::BadCategoryShape(category.to_string()));
            };
            let mut prompts = BTreeMap::new();
            for (sub_key, prompt) in subconcepts {
                let Some(subconcept) = sub_key.as_str() else {
                    return Err(ConfigError::BadCategoryShape(category.to_string()));
                };
                let Some(template) = prompt.as_str() else {
                    return Err(ConfigError::BadPromptShape(
                        category.to_string(),
                        subconcept.to_string(),
                    ));
                };
                if !template.contains(LANG_PLACEHOLDER) {
                    return Err(ConfigError::MissingPlaceholder(
                        category.to_string(),
                        subconcept.to_string(),
                    ));
                }
                prompts.insert(subconcept.to_string(), template.to_string());
            }
            categories.insert(category.to_string(), prompts);
        }
        Ok(Self { categories })
    }

    /// Build a set directly from already-validated entries (tests, fixtures).
    pub fn from_entries<I, C, S, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, S, T)>,
        C: Into<String>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut categories: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (category, subconcept, template) in entries {
            categories
                .entry(category.into())
                .or_default()
                .insert(subconcept.into(), template.into());
        }
        Self { categories }
    }

    /// The prompt template for one concept key path, if defined.
    pub fn template(&self, category: &str, subconcept: &str) -> Option<&str> {
        self.categories
            .get(category)?
            .get(subconcept)
            .map(String::as_str)
    }

    /// Iterate all (category, subconcept, template) triples in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.categories.iter().flat_map(|(category, subs)| {
            subs.iter()
                .map(move |(sub, template)| (category.as_str(), sub.as_str(), template.as_str()))
        })
    }

    /// Iterate all concept keys in order.
    pub fn keys(&self) -> impl Iterator<Item = ConceptKey> + '_ {
        self.iter()
            .map(|(category, subconcept, _)| ConceptKey::new(category, subconcept))
    }

    /// Category labels in order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Find the category a composite content key belongs to.
    ///
    /// Matches the composite form of every defined concept key first; when
    /// nothing matches (a content document can hold keys for concepts since
    /// removed from config) falls back to the text before the first
    /// underscore.
    pub fn category_for_composite(&self, composite: &str) -> String {
        for key in self.keys() {
            if key.composite() == composite {
                return key.category;
            }
        }
        composite
            .split_once('_')
            .map(|(category, _)| category.to_string())
            .unwrap_or_else(|| "General".to_string())
    }

    /// Total number of defined concepts.
    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONCEPTS_YAML: &str = "\
title: Language concept comparison
Datatypes:
  Primitives: Explain the primitive types in {lang}.
  Collections: Explain the collection types in {lang}.
Functions:
  Closures: Explain closures in {lang}.
";

    #[test]
    fn load_languages_reads_list() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prog_langs.yaml");
        std::fs::write(
            &path,
            "Programming Languages:\n  - Python 3.10\n  - Rust\n  - C++\n",
        )
        .unwrap();

        let langs = load_languages(&path).unwrap();
        assert_eq!(langs, vec!["Python 3.10", "Rust", "C++"]);
    }

    #[test]
    fn load_languages_missing_key_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prog_langs.yaml");
        std::fs::write(&path, "Languages:\n  - Rust\n").unwrap();
        assert!(matches!(
            load_languages(&path),
            Err(ConfigError::MissingLanguagesKey(_))
        ));
    }

    #[test]
    fn load_languages_non_string_entry_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prog_langs.yaml");
        std::fs::write(&path, "Programming Languages:\n  - Rust\n  - 42\n").unwrap();
        assert!(matches!(
            load_languages(&path),
            Err(ConfigError::BadLanguagesShape(_))
        ));
    }

    #[test]
    fn concept_set_parses_categories_and_skips_title() {
        let set = ConceptSet::from_yaml_str(CONCEPTS_YAML).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.template("Datatypes", "Primitives"),
            Some("Explain the primitive types in {lang}.")
        );
        assert_eq!(set.template("title", "anything"), None);
    }

    #[test]
    fn concept_set_iteration_is_ordered() {
        let set = ConceptSet::from_yaml_str(CONCEPTS_YAML).unwrap();
        let triples: Vec<_> = set.iter().map(|(c, s, _)| (c, s)).collect();
        assert_eq!(
            triples,
            vec![
                ("Datatypes", "Collections"),
                ("Datatypes", "Primitives"),
                ("Functions", "Closures"),
            ]
        );
    }

    #[test]
    fn concept_set_rejects_scalar_category() {
        let err = ConceptSet::from_yaml_str("Datatypes: just a string\n").unwrap_err();
        assert!(matches!(err, ConfigError::BadCategoryShape(c) if c == "Datatypes"));
    }

    #[test]
    fn concept_set_rejects_non_string_prompt() {
        let err = ConceptSet::from_yaml_str("Datatypes:\n  Primitives: [a, b]\n").unwrap_err();
        assert!(matches!(err, ConfigError::BadPromptShape(_, _)));
    }

    #[test]
    fn concept_set_rejects_prompt_without_placeholder() {
        let err =
            ConceptSet::from_yaml_str("Datatypes:\n  Primitives: No placeholder here\n")
                .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingPlaceholder(c, s) if c == "Datatypes" && s == "Primitives"
        ));
    }

    #[test]
    fn concept_set_allows_title_named_category_when_mapping() {
        // Only a *scalar* `title` entry is metadata; a mapping named `title`
        // is a real (if odd) category.
        let set =
            ConceptSet::from_yaml_str("title:\n  Casing: Explain title casing in {lang}.\n")
                .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn category_for_composite_matches_defined_keys() {
        let set = ConceptSet::from_entries([(
            "Error Handling",
            "Try / Catch",
            "Explain try/catch in {lang}.",
        )]);
        assert_eq!(
            set.category_for_composite("Error Handling_Try___Catch"),
            "Error Handling"
        );
    }

    #[test]
    fn category_for_composite_falls_back_to_prefix() {
        let set = ConceptSet::default();
        assert_eq!(set.category_for_composite("Datatypes_Removed"), "Datatypes");
        assert_eq!(set.category_for_composite("NoUnderscore"), "General");
    }
}
