//! Per-language prompt cache for incremental content generation.
//!
//! Calling the text-generation API is the expensive, rate-limited part of a
//! build. This module lets the generate stage skip the network when a
//! concept's explanation was already produced by the exact prompt template
//! currently configured.
//!
//! # Staleness detection
//!
//! The cache stores, per language, the prompt template text that was in
//! effect when each concept was last generated:
//!
//! ```yaml
//! Datatypes:
//!   Primitives: Explain the primitive types in {lang} with examples.
//! Functions:
//!   Closures: Explain closures in {lang}.
//! ```
//!
//! The template text is the version marker. [`PromptCache::exists`] reports a
//! hit only when the stored text equals the current template for the same
//! key path; editing one prompt in the concepts document invalidates exactly
//! the entries generated from it and nothing else. There is no eviction and
//! no TTL — a miss merely costs one regeneration, which is always safe.
//!
//! # Storage
//!
//! One YAML file per language at `{cache_dir}/{safe_name}.yaml`, rewritten
//! whole after every [`PromptCache::update`]. A missing file loads as an
//! empty cache; an unreadable or malformed file propagates to the caller,
//! who may delete it and take the full-regeneration cost.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ConceptSet;
use crate::naming::safe_name;

type CacheMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("no prompt defined for '{0}' / '{1}'")]
    UnknownConcept(String, String),
}

/// Prompt cache for one language, constructed per run and passed explicitly
/// into the generator — no process-wide state to reset between tests.
#[derive(Debug, Clone)]
pub struct PromptCache {
    path: PathBuf,
    entries: CacheMap,
}

impl PromptCache {
    /// An empty cache (first run, or `--no-cache`). Also covers the
    /// previously-unset state: the first `update` on it simply creates the
    /// one inserted entry.
    pub fn empty(cache_dir: &Path, language: &str) -> Self {
        Self {
            path: Self::file_path(cache_dir, language),
            entries: CacheMap::new(),
        }
    }

    /// Load the persisted cache for a language. A missing file is an empty
    /// cache; a malformed one is an error for the caller to surface.
    pub fn load(cache_dir: &Path, language: &str) -> Result<Self, CacheError> {
        let path = Self::file_path(cache_dir, language);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    entries: CacheMap::new(),
                });
            }
            Err(e) => return Err(CacheError::Io(e)),
        };
        let entries = serde_yaml::from_str(&raw)?;
        Ok(Self { path, entries })
    }

    /// Cache file path for a language: `{cache_dir}/{safe_name}.yaml`.
    pub fn file_path(cache_dir: &Path, language: &str) -> PathBuf {
        cache_dir.join(format!("{}.yaml", safe_name(language)))
    }

    /// True iff the cache holds a value at this exact key path **and** that
    /// value equals the current prompt template in `concepts`. Any missing
    /// level or text mismatch is a miss — the sole staleness mechanism.
    pub fn exists(&self, concepts: &ConceptSet, category: &str, subconcept: &str) -> bool {
        let Some(cached) = self
            .entries
            .get(category)
            .and_then(|subs| subs.get(subconcept))
        else {
            return false;
        };
        concepts.template(category, subconcept) == Some(cached.as_str())
    }

    /// Record the current prompt template at this key path (auto-creating
    /// the category level) and persist the whole per-language mapping,
    /// overwriting the file.
    pub fn update(
        &mut self,
        concepts: &ConceptSet,
        category: &str,
        subconcept: &str,
    ) -> Result<(), CacheError> {
        let template = concepts.template(category, subconcept).ok_or_else(|| {
            CacheError::UnknownConcept(category.to_string(), subconcept.to_string())
        })?;
        self.entries
            .entry(category.to_string())
            .or_default()
            .insert(subconcept.to_string(), template.to_string());
        self.save()
    }

    fn save(&self) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(&self.entries)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cached entries across all categories.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
