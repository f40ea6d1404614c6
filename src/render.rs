//! HTML site rendering.
//!
//! Takes the per-language content documents produced by the generate stage
//! and renders the publishable site:
//!
//! - **Concept pages** (`concepts/{language}/{concept}.html`): one page per
//!   (language, concept) pair with the generated explanation, SEO meta tags,
//!   JSON-LD structured data, and cross-links to the same concept in every
//!   other language.
//! - **Landing pages** (`concepts/{language}.html`): one page per language
//!   grouping its concepts by category, with concept/category counts.
//!
//! ## Output structure
//!
//! ```text
//! docs/
//! ├── index.html                     # existing comparison table (not ours)
//! ├── sitemap.xml                    # emitted by the sitemap stage
//! └── concepts/
//!     ├── python-310.html            # language landing page
//!     └── python-310/
//!         ├── datatypes_primitives.html
//!         └── functions_closures.html
//! ```
//!
//! ## Determinism
//!
//! Rendering is a pure function of the content documents and the language
//! list, except for the `dateModified` field sourced from the content file's
//! history. All iteration goes through BTreeMaps, so re-rendering unchanged
//! input reproduces byte-identical page bodies.
//!
//! ## HTML generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating
//! with automatic escaping; generated markdown bodies are converted with
//! pulldown-cmark and injected pre-escaped.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::ConceptSet;
use crate::naming::{display_name, slugify, title_case};
use crate::sitemap::last_modified;
use crate::types::{ContentDoc, ContentDocError};

const CSS: &str = include_str!("../static/style.css");

/// Publication date used in structured data for all pages.
const DATE_PUBLISHED: &str = "2023-06-09";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content document error: {0}")]
    Content(#[from] ContentDocError),
}

/// Per-language render outcome.
#[derive(Debug)]
pub struct LanguageRender {
    pub language: String,
    pub concept_pages: usize,
}

/// Summary of a render run.
#[derive(Debug, Default)]
pub struct RenderSummary {
    pub languages: Vec<LanguageRender>,
    /// Languages with no content document yet (generation pending).
    pub skipped: Vec<String>,
    pub landing_pages: usize,
}

impl RenderSummary {
    pub fn concept_pages(&self) -> usize {
        self.languages.iter().map(|l| l.concept_pages).sum()
    }

    pub fn total_pages(&self) -> usize {
        self.concept_pages() + self.landing_pages
    }
}

/// Render the full site: every concept page and every landing page.
///
/// Languages without a content document are skipped with a note in the
/// summary; their pages appear on the next render after generation.
pub fn render_site(
    languages: &[String],
    concepts: &ConceptSet,
    content_dir: &Path,
    docs_dir: &Path,
    base_url: &str,
) -> Result<RenderSummary, RenderError> {
    let mut summary = RenderSummary::default();
    let concepts_dir = docs_dir.join("concepts");

    for language in languages {
        if !ContentDoc::path(content_dir, language).exists() {
            summary.skipped.push(language.clone());
            continue;
        }
        let doc = ContentDoc::load(content_dir, language)?;
        let lastmod = last_modified(&ContentDoc::path(content_dir, language));

        let lang_dir = concepts_dir.join(slugify(language));
        fs::create_dir_all(&lang_dir)?;

        let mut pages = 0;
        for (composite, markdown) in doc.iter() {
            let page = render_concept_page(
                language, composite, markdown, concepts, languages, base_url, &lastmod,
            );
            let filename = format!("{}.html", slugify(composite));
            fs::write(lang_dir.join(filename), page.into_string())?;
            pages += 1;
        }

        let landing = render_landing_page(language, &doc, concepts, base_url);
        fs::write(
            concepts_dir.join(format!("{}.html", slugify(language))),
            landing.into_string(),
        )?;
        summary.landing_pages += 1;

        summary.languages.push(LanguageRender {
            language: language.clone(),
            concept_pages: pages,
        });
    }
    Ok(summary)
}

/// Convert generated markdown to HTML.
fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Human-readable concept title from a composite key:
/// `"Datatypes_Primitive_types"` → `"Primitive types"`.
fn concept_title(composite: &str) -> String {
    match composite.split_once('_') {
        Some((_, subconcept)) => display_name(subconcept),
        None => display_name(composite),
    }
}

// ============================================================================
// HTML components
// ============================================================================

/// Meta tags shared by every page: title/description/keywords, canonical
/// URL, Open Graph and Twitter cards.
fn head_meta(title: &str, description: &str, keywords: &str, page_url: &str, og_type: &str) -> Markup {
    html! {
        meta charset="UTF-8";
        meta name="viewport" content="width=device-width, initial-scale=1.0";

        title { (title) " - Polyglot Pages" }
        meta name="title" content={ (title) " - Polyglot Pages" };
        meta name="description" content=(description);
        meta name="keywords" content=(keywords);

        meta property="og:type" content=(og_type);
        meta property="og:url" content=(page_url);
        meta property="og:title" content=(title);
        meta property="og:description" content=(description);

        meta property="twitter:card" content="summary";
        meta property="twitter:url" content=(page_url);
        meta property="twitter:title" content=(title);
        meta property="twitter:description" content=(description);

        link rel="canonical" href=(page_url);
        style { (CSS) }
    }
}

fn footer() -> Markup {
    html! {
        footer {
            p { "Content generated using AI" }
        }
    }
}

/// Cross-link grid: the same concept in every other language.
fn related_languages(current: &str, concept_slug: &str, all_languages: &[String]) -> Markup {
    let others: Vec<&String> = all_languages.iter().filter(|l| *l != current).collect();
    if others.is_empty() {
        return html! {};
    }
    html! {
        section.related-concepts {
            h2 { "See this concept in other languages" }
            div.related-grid {
                @for language in others {
                    a href={ "../" (slugify(language)) "/" (concept_slug) ".html" } {
                        (display_name(language))
                    }
                }
            }
        }
    }
}

/// JSON-LD structured data block.
fn json_ld(value: serde_json::Value) -> Markup {
    // serde_json escapes string contents, so the payload cannot terminate
    // the surrounding script element.
    let payload = serde_json::to_string_pretty(&value).unwrap_or_default();
    html! {
        script type="application/ld+json" { (PreEscaped(payload)) }
    }
}

// ============================================================================
// Page renderers
// ============================================================================

/// Render one concept page.
fn render_concept_page(
    language: &str,
    composite: &str,
    markdown: &str,
    concepts: &ConceptSet,
    all_languages: &[String],
    base_url: &str,
    date_modified: &str,
) -> Markup {
    let language_display = display_name(language);
    let title = concept_title(composite);
    let full_title = format!("{title} in {language_display}");
    let description = format!(
        "Learn how to {} in {}. See code examples and detailed explanations.",
        title.to_lowercase(),
        language_display
    );
    let category = concepts.category_for_composite(composite);
    let keywords = format!(
        "{}, {}, programming, code examples, syntax, {}",
        language_display,
        display_name(composite),
        category
    );

    let language_slug = slugify(language);
    let concept_slug = slugify(composite);
    let page_url = format!("{base_url}/concepts/{language_slug}/{concept_slug}.html");

    let body_html = markdown_to_html(markdown);

    let structured = serde_json::json!({
        "@context": "https://schema.org",
        "@type": "TechArticle",
        "headline": full_title,
        "description": description,
        "keywords": format!("{language_display}, {title}, programming"),
        "url": page_url,
        "datePublished": DATE_PUBLISHED,
        "dateModified": date_modified,
        "author": { "@type": "Organization", "name": "Polyglot Pages" },
        "publisher": { "@type": "Organization", "name": "Polyglot Pages", "url": base_url },
        "mainEntityOfPage": { "@type": "WebPage", "@id": page_url },
    });

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                (head_meta(&full_title, &description, &keywords, &page_url, "article"))
                (json_ld(structured))
            }
            body {
                div.container {
                    nav.breadcrumb aria-label="Breadcrumb" {
                        a href="../../index.html" { "Home" }
                        span { "›" }
                        a href={ "../" (language_slug) ".html" } { (language_display) }
                        span { "›" }
                        span { (title) }
                    }
                    main {
                        h1 { (full_title) }
                        div.meta {
                            strong { "Category:" } " " (category) " | "
                            strong { "Language:" } " " (language_display)
                        }
                        article.content {
                            (PreEscaped(body_html))
                        }
                        (related_languages(language, &concept_slug, all_languages))
                        div.back-link {
                            a href="../../index.html" { "← Back to Full Comparison Table" }
                        }
                    }
                    (footer())
                }
            }
        }
    }
}

/// Render one language landing page grouping its concepts by category.
fn render_landing_page(
    language: &str,
    doc: &ContentDoc,
    concepts: &ConceptSet,
    base_url: &str,
) -> Markup {
    let language_display = display_name(language);
    let language_slug = slugify(language);
    let page_url = format!("{base_url}/concepts/{language_slug}.html");

    // Group the document's concepts by category. BTreeMap keeps both the
    // section order and the card order stable across runs.
    let mut categories: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    for (composite, _) in doc.iter() {
        let category = concepts.category_for_composite(composite);
        let name = title_case(&concept_title(composite));
        categories
            .entry(category)
            .or_default()
            .push((name, slugify(composite)));
    }
    for cards in categories.values_mut() {
        cards.sort();
    }

    let concept_count = doc.len();
    let category_count = categories.len();
    let description = format!(
        "Learn {language_display} programming with {concept_count} detailed concept \
         explanations and code examples. Compare syntax, features, and best practices \
         with other languages."
    );
    let keywords = format!("{language_display}, programming, code examples, syntax, tutorial, reference");
    let title = format!("{language_display} Programming Concepts");

    let structured = serde_json::json!({
        "@context": "https://schema.org",
        "@type": "CollectionPage",
        "name": title,
        "description": description,
        "url": page_url,
        "isPartOf": { "@type": "WebSite", "name": "Polyglot Pages", "url": base_url },
        "about": { "@type": "ComputerLanguage", "name": language_display },
    });

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                (head_meta(&title, &description, &keywords, &page_url, "website"))
                (json_ld(structured))
            }
            body {
                nav {
                    a href="../index.html" { "← Back to Language Comparison Table" }
                }
                header {
                    h1 { (title) }
                    p.intro {
                        "Explore " (language_display) " programming with detailed explanations "
                        "and code examples across " (concept_count) " concepts."
                    }
                }
                div.stats {
                    div.stats-grid {
                        div.stat-item {
                            div.stat-number { (concept_count) }
                            div.stat-label { "Concepts Covered" }
                        }
                        div.stat-item {
                            div.stat-number { (category_count) }
                            div.stat-label { "Categories" }
                        }
                    }
                }
                main {
                    h2 { "All Concepts" }
                    @for (category, cards) in &categories {
                        section.category-section {
                            h3 { (title_case(category)) }
                            div.grid {
                                @for (name, slug) in cards {
                                    div.concept-card {
                                        a href={ (language_slug) "/" (slug) ".html" } { (name) }
                                    }
                                }
                            }
                        }
                    }
                }
                (footer())
            }
        }
    }
}
