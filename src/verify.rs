//! Post-build sitemap integrity check.
//!
//! Parses `sitemap.xml`, maps every `<loc>` URL back to a path under the
//! docs directory, and reports URLs with no corresponding file. A published
//! sitemap pointing at 404s is worse than no sitemap, so `verify` is meant
//! to run after every build and gate deployment with its exit code.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sitemap not found: {0}")]
    MissingSitemap(String),
}

/// A sitemap URL whose expected file does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub url: String,
    pub expected: PathBuf,
}

/// Result of a verification pass.
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub checked: usize,
    pub missing: Vec<Mismatch>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check every sitemap URL against the docs file tree.
pub fn verify(sitemap_path: &Path, docs_dir: &Path, base_url: &str) -> Result<VerifyReport, VerifyError> {
    let xml = match fs::read_to_string(sitemap_path) {
        Ok(xml) => xml,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VerifyError::MissingSitemap(
                sitemap_path.display().to_string(),
            ));
        }
        Err(e) => return Err(VerifyError::Io(e)),
    };

    let mut report = VerifyReport::default();
    for url in extract_locs(&xml) {
        let expected = url_to_path(&url, base_url, docs_dir);
        report.checked += 1;
        if !expected.exists() {
            report.missing.push(Mismatch { url, expected });
        }
    }
    Ok(report)
}

/// Pull `<loc>` contents out of sitemap XML. The sitemap schema keeps loc
/// elements flat and entity-escaped, so a line scanner is sufficient — no
/// XML parser dependency for five entities.
fn extract_locs(xml: &str) -> Vec<String> {
    let mut locs = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<loc>") {
        rest = &rest[start + "<loc>".len()..];
        let Some(end) = rest.find("</loc>") else {
            break;
        };
        locs.push(xml_unescape(rest[..end].trim()));
        rest = &rest[end + "</loc>".len()..];
    }
    locs
}

/// Map a sitemap URL to the file that must exist for it.
///
/// `{base}/` → `index.html`; a trailing slash anywhere else implies that
/// directory's `index.html`; otherwise the path maps verbatim.
fn url_to_path(url: &str, base_url: &str, docs_dir: &Path) -> PathBuf {
    let base = base_url.trim_end_matches('/');
    let path = url.strip_prefix(base).unwrap_or(url);
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        docs_dir.join("index.html")
    } else if path.ends_with('/') {
        docs_dir.join(path).join("index.html")
    } else {
        docs_dir.join(path)
    }
}

fn xml_unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
