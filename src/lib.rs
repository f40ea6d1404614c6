//! # Polyglot Pages
//!
//! A static site generator for AI-written programming-language concept pages.
//! Two YAML files are the data source: a list of languages and a nested
//! mapping of concept category → subconcept → prompt template. The site is
//! one HTML page per (language, concept) pair plus a landing page per
//! language, with a sitemap covering all of them.
//!
//! # Architecture: Staged Pipeline
//!
//! Content flows through independent stages, each reading and writing plain
//! files that the next stage consumes:
//!
//! ```text
//! 1. Generate   YAML config  →  content JSON     (prompts → LLM → markdown per concept)
//! 2. Render     content JSON →  docs/concepts/   (concept pages + language landings)
//! 3. Sitemap    docs/        →  docs/sitemap.xml (every page, with lastmod)
//! 4. Verify     sitemap.xml  →  exit code        (every URL resolves to a file)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Cost control**: generation is the only stage that talks to a paid API.
//!   Rendering, sitemap and verification re-run freely against the content
//!   documents on disk.
//! - **Debuggability**: content documents are human-readable JSON and the
//!   prompt cache is human-readable YAML — you can inspect exactly what was
//!   generated and which prompt produced it.
//! - **Testability**: each stage is a function from files to files, so tests
//!   exercise pipeline logic with temp directories and a scripted client.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | YAML loading: language list and the validated concept set |
//! | [`generate`] | Stage 1 — per-language generation loop over the concept set |
//! | [`client`] | Chat-completions client behind the [`client::TextGenerator`] seam, with retry |
//! | [`cache`] | Per-language prompt cache; detects edited templates and regenerates |
//! | [`render`] | Stage 2 — renders concept and landing pages using Maud |
//! | [`sitemap`] | Stage 3 — sitemap.xml with lastmod/changefreq/priority per page tier |
//! | [`verify`] | Stage 4 — checks every sitemap URL against the file tree |
//! | [`types`] | Shared types: concept keys and persisted content documents |
//! | [`naming`] | Safe filesystem names and URL slugs for language labels |
//! | [`output`] | CLI output formatting — pure `format_*` functions plus print wrappers |
//!
//! # Design Decisions
//!
//! ## Prompt Templates Are the Cache Key
//!
//! The cache does not store timestamps or content hashes: it stores the
//! prompt template exactly as it read when a concept was last generated.
//! A concept is fresh iff the cached template equals the current one, so
//! editing a template in the config invalidates exactly that concept for
//! every language, and nothing else. See [`cache::PromptCache::exists`].
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system, rather than Handlebars or Tera:
//!
//! - **Compile-time checking**: malformed HTML is a build error, not a runtime surprise.
//! - **Type-safe**: template variables are Rust expressions — no stringly-typed lookups.
//! - **XSS-safe by default**: all interpolation is auto-escaped, which matters
//!   when page bodies come from an LLM.
//! - **Zero runtime files**: no template directory to ship or get out of sync.
//!
//! ## Blocking HTTP, Sequential Generation
//!
//! The client is `reqwest::blocking` and languages are generated one at a
//! time. The bottleneck is the completion API's rate limit, not local
//! concurrency; a sequential loop with randomized exponential backoff is the
//! whole story, and every stage stays a plain function call.
//!
//! ## Deterministic Output
//!
//! Config, cache and content documents all live in `BTreeMap`s, so every
//! iteration order is the sorted key order. Rendering the same inputs twice
//! produces byte-identical pages, which keeps site diffs reviewable.
//!
//! # Failure Containment
//!
//! A concept that exhausts its retries is recorded in the run summary and
//! generation moves on; its cache entry stays stale so the next run retries
//! it. A filesystem error aborts only the language it occurred in, and the
//! content generated before the abort is persisted. Config errors are fatal.

pub mod cache;
pub mod client;
pub mod config;
pub mod generate;
pub mod naming;
pub mod output;
pub mod render;
pub mod sitemap;
pub mod types;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_helpers;
