//! Content generation orchestration.
//!
//! For every language, for every category, for every subconcept: build the
//! concrete prompt by substituting the language label into the template,
//! consult the prompt cache, and either reuse the previously generated text
//! or call the text-generation collaborator and record the result.
//!
//! ```text
//! prog_langs.yaml ─┐
//!                  ├─► generate ──► content-autogen/<model>/<lang>.json
//! concepts.yaml ───┘      │
//!                    .cache/<lang>.yaml   (template-as-generated markers)
//! ```
//!
//! # Failure containment
//!
//! Failures are contained to the smallest unit that makes sense:
//!
//! - a concept whose retries are exhausted is recorded in the run summary
//!   and generation moves on to the next concept;
//! - a filesystem error aborts the current language but not the others;
//! - config errors are fatal before any language starts.
//!
//! Content documents are persisted after each language, and best-effort
//! persisted when a language aborts mid-way, so text that was already
//! generated is never lost to a later failure.

use std::path::Path;
use thiserror::Error;

use crate::cache::{CacheError, PromptCache};
use crate::client::{ClientError, TextGenerator};
use crate::config::{ConceptSet, LANG_PLACEHOLDER};
use crate::types::{ConceptKey, ContentDoc, ContentDocError};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("content document error: {0}")]
    Content(#[from] ContentDocError),
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

/// Knobs for a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// When false, ignore the prompt cache and regenerate everything.
    pub use_cache: bool,
    /// Maximum completion size passed to the collaborator.
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            max_tokens: 2000,
        }
    }
}

/// One concept that exhausted its retry budget this run. It stays
/// cache-stale and will be retried on the next run.
#[derive(Debug)]
pub struct FailedConcept {
    pub composite: String,
    pub error: String,
}

/// Outcome of one language's generation pass.
#[derive(Debug)]
pub struct LanguageReport {
    pub language: String,
    pub generated: usize,
    pub reused: usize,
    pub failed: Vec<FailedConcept>,
    /// Set when a filesystem error aborted this language mid-run.
    pub aborted: Option<String>,
}

/// Summary across all languages.
#[derive(Debug, Default)]
pub struct GenerateSummary {
    pub reports: Vec<LanguageReport>,
}

impl GenerateSummary {
    pub fn total_generated(&self) -> usize {
        self.reports.iter().map(|r| r.generated).sum()
    }

    pub fn total_reused(&self) -> usize {
        self.reports.iter().map(|r| r.reused).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.reports.iter().map(|r| r.failed.len()).sum()
    }

    /// True when no language made any progress: every report aborted.
    ///
    /// Per-concept failures are not counted here — they are contained,
    /// reported as warnings, and retried on the next run.
    pub fn all_aborted(&self) -> bool {
        !self.reports.is_empty() && self.reports.iter().all(|r| r.aborted.is_some())
    }
}

/// Run content generation for every language.
///
/// Each language is independent: an abort in one is recorded in its report
/// and the loop continues with the next.
pub fn generate(
    languages: &[String],
    concepts: &ConceptSet,
    client: &dyn TextGenerator,
    cache_dir: &Path,
    content_dir: &Path,
    options: &GenerateOptions,
) -> GenerateSummary {
    let mut summary = GenerateSummary::default();
    for language in languages {
        let report = generate_language(language, concepts, client, cache_dir, content_dir, options);
        summary.reports.push(report);
    }
    summary
}

/// Generate content for a single language, returning its report.
pub fn generate_language(
    language: &str,
    concepts: &ConceptSet,
    client: &dyn TextGenerator,
    cache_dir: &Path,
    content_dir: &Path,
    options: &GenerateOptions,
) -> LanguageReport {
    let mut report = LanguageReport {
        language: language.to_string(),
        generated: 0,
        reused: 0,
        failed: Vec::new(),
        aborted: None,
    };

    let mut cache = if options.use_cache {
        match PromptCache::load(cache_dir, language) {
            Ok(cache) => cache,
            Err(e) => {
                report.aborted = Some(e.to_string());
                return report;
            }
        }
    } else {
        PromptCache::empty(cache_dir, language)
    };

    let mut doc = match ContentDoc::load(content_dir, language) {
        Ok(doc) => doc,
        Err(e) => {
            report.aborted = Some(e.to_string());
            return report;
        }
    };

    let run = run_concepts(
        language, concepts, client, &mut cache, &mut doc, options, &mut report,
    );

    // Persist whatever was generated, even when the loop aborted — earlier
    // concepts' text must survive a later failure.
    if let Err(e) = doc.save(content_dir, language) {
        report.aborted.get_or_insert(e.to_string());
        return report;
    }
    if let Err(e) = run {
        report.aborted = Some(e.to_string());
    }
    report
}

fn run_concepts(
    language: &str,
    concepts: &ConceptSet,
    client: &dyn TextGenerator,
    cache: &mut PromptCache,
    doc: &mut ContentDoc,
    options: &GenerateOptions,
    report: &mut LanguageReport,
) -> Result<(), GenerateError> {
    for (category, subconcept, template) in concepts.iter() {
        let composite = ConceptKey::new(category, subconcept).composite();
        let fresh = options.use_cache
            && cache.exists(concepts, category, subconcept)
            && doc.contains(&composite);
        if fresh {
            report.reused += 1;
            continue;
        }

        let prompt = template.replace(LANG_PLACEHOLDER, language);
        match client.generate(&prompt, options.max_tokens) {
            Ok(text) => {
                doc.insert(composite, text);
                cache.update(concepts, category, subconcept)?;
                report.generated += 1;
            }
            Err(e @ ClientError::MissingApiKey) => {
                // Nothing later in the run can succeed without a key.
                return Err(e.into());
            }
            Err(e) => {
                report.failed.push(FailedConcept {
                    composite,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedGenerator;
    use tempfile::TempDir;

    fn concepts() -> ConceptSet {
        ConceptSet::from_entries([
            ("Datatypes", "Primitives", "Explain primitive types in {lang}"),
            ("Functions", "Closures", "Explain closures in {lang}"),
        ])
    }

    #[test]
    fn generates_all_concepts_on_first_run() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let content_dir = tmp.path().join("content");
        let client = ScriptedGenerator::always("generated text");

        let languages = vec!["Rust".to_string()];
        let summary = generate(
            &languages,
            &concepts(),
            &client,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );

        assert_eq!(summary.total_generated(), 2);
        assert_eq!(summary.total_reused(), 0);
        assert_eq!(summary.total_failed(), 0);

        let doc = ContentDoc::load(&content_dir, "Rust").unwrap();
        assert_eq!(doc.get("Datatypes_Primitives"), Some("generated text"));
        assert_eq!(doc.get("Functions_Closures"), Some("generated text"));
    }

    #[test]
    fn prompts_substitute_language_label() {
        let tmp = TempDir::new().unwrap();
        let client = ScriptedGenerator::always("ok");
        generate_language(
            "Python 3.10",
            &concepts(),
            &client,
            &tmp.path().join("cache"),
            &tmp.path().join("content"),
            &GenerateOptions::default(),
        );
        let prompts = client.prompts();
        assert!(
            prompts
                .iter()
                .any(|p| p == "Explain primitive types in Python 3.10")
        );
        assert!(prompts.iter().all(|p| !p.contains("{lang}")));
    }

    #[test]
    fn second_run_reuses_cached_concepts() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let content_dir = tmp.path().join("content");
        let concepts = concepts();

        let client = ScriptedGenerator::always("text");
        let first = generate_language(
            "Rust",
            &concepts,
            &client,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );
        assert_eq!(first.generated, 2);

        let second_client = ScriptedGenerator::always("should not be called");
        let second = generate_language(
            "Rust",
            &concepts,
            &second_client,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );
        assert_eq!(second.generated, 0);
        assert_eq!(second.reused, 2);
        assert!(second_client.prompts().is_empty());
    }

    #[test]
    fn changed_template_regenerates_only_that_concept() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let content_dir = tmp.path().join("content");

        let client = ScriptedGenerator::always("v1");
        generate_language(
            "Rust",
            &concepts(),
            &client,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );

        let edited = ConceptSet::from_entries([
            ("Datatypes", "Primitives", "REVISED: explain primitives in {lang}"),
            ("Functions", "Closures", "Explain closures in {lang}"),
        ]);
        let client2 = ScriptedGenerator::always("v2");
        let report = generate_language(
            "Rust",
            &edited,
            &client2,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );

        assert_eq!(report.generated, 1);
        assert_eq!(report.reused, 1);
        let doc = ContentDoc::load(&content_dir, "Rust").unwrap();
        assert_eq!(doc.get("Datatypes_Primitives"), Some("v2"));
        assert_eq!(doc.get("Functions_Closures"), Some("v1"));
    }

    #[test]
    fn no_cache_option_regenerates_everything() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let content_dir = tmp.path().join("content");
        let concepts = concepts();

        let client = ScriptedGenerator::always("v1");
        generate_language(
            "Rust",
            &concepts,
            &client,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );

        let client2 = ScriptedGenerator::always("v2");
        let options = GenerateOptions {
            use_cache: false,
            ..GenerateOptions::default()
        };
        let report =
            generate_language("Rust", &concepts, &client2, &cache_dir, &content_dir, &options);
        assert_eq!(report.generated, 2);
        assert_eq!(report.reused, 0);
    }

    #[test]
    fn failed_concept_is_contained_and_earlier_text_persists() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let content_dir = tmp.path().join("content");

        // First concept succeeds, second exhausts its retries.
        let client = ScriptedGenerator::script([
            Ok("explained".to_string()),
            Err(ClientError::RateLimited("try later".into())),
        ]);
        let report = generate_language(
            "Rust",
            &concepts(),
            &client,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );

        assert_eq!(report.generated, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].composite, "Functions_Closures");
        assert!(report.aborted.is_none());

        // The successful concept's text was persisted despite the failure.
        let doc = ContentDoc::load(&content_dir, "Rust").unwrap();
        assert_eq!(doc.get("Datatypes_Primitives"), Some("explained"));
        assert!(doc.get("Functions_Closures").is_none());

        // The failed concept stays cache-stale and regenerates next run.
        let retry_client = ScriptedGenerator::always("recovered");
        let retry = generate_language(
            "Rust",
            &concepts(),
            &retry_client,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );
        assert_eq!(retry.generated, 1);
        assert_eq!(retry.reused, 1);
    }

    #[test]
    fn partial_failure_is_not_all_aborted() {
        let tmp = TempDir::new().unwrap();
        let client = ScriptedGenerator::script([
            Ok("explained".to_string()),
            Err(ClientError::RateLimited("try later".into())),
        ]);
        let languages = vec!["Rust".to_string()];
        let summary = generate(
            &languages,
            &concepts(),
            &client,
            &tmp.path().join("cache"),
            &tmp.path().join("content"),
            &GenerateOptions::default(),
        );

        // One concept failed but content was generated and persisted; the
        // run as a whole succeeded.
        assert_eq!(summary.total_failed(), 1);
        assert_eq!(summary.total_generated(), 1);
        assert!(!summary.all_aborted());
    }

    #[test]
    fn all_aborted_only_when_every_language_aborted() {
        fn report(language: &str, aborted: Option<&str>) -> LanguageReport {
            LanguageReport {
                language: language.to_string(),
                generated: 0,
                reused: 0,
                failed: Vec::new(),
                aborted: aborted.map(str::to_string),
            }
        }

        let summary = GenerateSummary {
            reports: vec![
                report("Rust", Some("disk full")),
                report("Go", Some("disk full")),
            ],
        };
        assert!(summary.all_aborted());

        let summary = GenerateSummary {
            reports: vec![report("Rust", None), report("Go", Some("disk full"))],
        };
        assert!(!summary.all_aborted());

        assert!(!GenerateSummary::default().all_aborted());
    }

    #[test]
    fn one_language_failure_does_not_block_others() {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("cache");
        let content_dir = tmp.path().join("content");
        let concepts = ConceptSet::from_entries([(
            "Datatypes",
            "Primitives",
            "Explain primitives in {lang}",
        )]);

        let client = ScriptedGenerator::script([
            Err(ClientError::Connection("unreachable".into())),
            Ok("fine for the second language".to_string()),
        ]);
        let languages = vec!["Rust".to_string(), "Go".to_string()];
        let summary = generate(
            &languages,
            &concepts,
            &client,
            &cache_dir,
            &content_dir,
            &GenerateOptions::default(),
        );

        assert_eq!(summary.total_failed(), 1);
        assert_eq!(summary.total_generated(), 1);
        let go = ContentDoc::load(&content_dir, "Go").unwrap();
        assert!(go.contains("Datatypes_Primitives"));
    }
}
