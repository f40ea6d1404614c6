//! End-to-end pipeline test: YAML config → generation (scripted client) →
//! rendered pages → sitemap → verification.
//!
//! Everything runs against a temp docs directory; the only fake is the
//! completions client.

use std::fs;
use std::path::Path;

use polyglot_pages::client::{ClientError, TextGenerator};
use polyglot_pages::config::{ConceptSet, load_languages};
use polyglot_pages::generate::{GenerateOptions, generate};
use polyglot_pages::render::render_site;
use polyglot_pages::sitemap::{SITEMAP_FILENAME, write_sitemap};
use polyglot_pages::types::ContentDoc;
use polyglot_pages::verify::verify;
use tempfile::TempDir;

const BASE_URL: &str = "https://example.org";

const LANGS_YAML: &str = "\
Programming Languages:
  - Python 3.10
  - Rust
";

const CONCEPTS_YAML: &str = "\
title: Language concepts
Datatypes:
  Primitives: \"Explain primitive datatypes in {lang} with examples\"
  Strings: \"Explain strings in {lang} with examples\"
Functions:
  Closures: \"Explain closures in {lang} with examples\"
";

/// Replies to every prompt with a small markdown body echoing the prompt.
struct CannedClient;

impl TextGenerator for CannedClient {
    fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, ClientError> {
        Ok(format!("# Explanation\n\nGenerated for: {prompt}"))
    }
}

/// Lay out a docs directory with config files and the hand-maintained index.
fn setup_docs() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path();
    fs::write(docs.join("prog_langs.yaml"), LANGS_YAML).unwrap();
    fs::write(docs.join("prog_lang_concepts.yaml"), CONCEPTS_YAML).unwrap();
    fs::write(docs.join("index.html"), "<html><body>index</body></html>").unwrap();
    tmp
}

fn content_dir(docs: &Path) -> std::path::PathBuf {
    docs.join("content-autogen").join("gpt_3_5_turbo")
}

#[test]
fn full_pipeline_produces_a_verifiable_site() {
    let tmp = setup_docs();
    let docs = tmp.path();
    let cache_dir = docs.join(".cache");
    let content_dir = content_dir(docs);

    let languages = load_languages(&docs.join("prog_langs.yaml")).unwrap();
    assert_eq!(languages, vec!["Python 3.10", "Rust"]);
    let concepts = ConceptSet::load(&docs.join("prog_lang_concepts.yaml")).unwrap();
    assert_eq!(concepts.len(), 3);

    let summary = generate(
        &languages,
        &concepts,
        &CannedClient,
        &cache_dir,
        &content_dir,
        &GenerateOptions::default(),
    );
    assert_eq!(summary.total_generated(), 6);
    assert_eq!(summary.total_failed(), 0);

    // Content documents land under the model-named directory.
    let doc = ContentDoc::load(&content_dir, "Python 3.10").unwrap();
    assert_eq!(doc.len(), 3);
    assert!(
        doc.get("Datatypes_Primitives")
            .unwrap()
            .contains("in Python 3.10 with examples")
    );

    let render = render_site(&languages, &concepts, &content_dir, docs, BASE_URL).unwrap();
    assert_eq!(render.concept_pages(), 6);
    assert_eq!(render.landing_pages, 2);
    assert!(render.skipped.is_empty());

    assert!(docs.join("concepts/python-310/datatypes_primitives.html").exists());
    assert!(docs.join("concepts/rust.html").exists());

    // Sitemap covers the index plus every rendered page, and every URL
    // resolves back to a file.
    let count = write_sitemap(docs, BASE_URL).unwrap();
    assert_eq!(count, 1 + render.total_pages());

    let report = verify(&docs.join(SITEMAP_FILENAME), docs, BASE_URL).unwrap();
    assert!(report.is_clean(), "mismatches: {:?}", report.missing);
    assert_eq!(report.checked, count);
}

#[test]
fn rerun_reuses_cache_and_verify_flags_deleted_pages() {
    let tmp = setup_docs();
    let docs = tmp.path();
    let cache_dir = docs.join(".cache");
    let content_dir = content_dir(docs);

    let languages = load_languages(&docs.join("prog_langs.yaml")).unwrap();
    let concepts = ConceptSet::load(&docs.join("prog_lang_concepts.yaml")).unwrap();

    let first = generate(
        &languages,
        &concepts,
        &CannedClient,
        &cache_dir,
        &content_dir,
        &GenerateOptions::default(),
    );
    assert_eq!(first.total_generated(), 6);

    let second = generate(
        &languages,
        &concepts,
        &CannedClient,
        &cache_dir,
        &content_dir,
        &GenerateOptions::default(),
    );
    assert_eq!(second.total_generated(), 0);
    assert_eq!(second.total_reused(), 6);

    render_site(&languages, &concepts, &content_dir, docs, BASE_URL).unwrap();
    write_sitemap(docs, BASE_URL).unwrap();

    let victim = docs.join("concepts/rust/functions_closures.html");
    fs::remove_file(&victim).unwrap();

    let report = verify(&docs.join(SITEMAP_FILENAME), docs, BASE_URL).unwrap();
    assert_eq!(report.missing.len(), 1);
    assert!(report.missing[0].url.ends_with("/concepts/rust/functions_closures.html"));
    assert_eq!(report.missing[0].expected, victim);
}
