//! Sitemap generation.
//!
//! Walks the rendered `concepts/` tree and emits `sitemap.xml` at the docs
//! root, covering the main index page, every language landing page and every
//! concept page. Landing pages rank higher (priority 0.9, weekly) than
//! individual concept pages (0.8, monthly); the index page is 1.0.
//!
//! `lastmod` is sourced from git history when available, falling back to the
//! file's modification time, then to today — the one non-deterministic input
//! of the render pipeline.

use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::process::Command;
use thiserror::Error;
use walkdir::WalkDir;

/// Name of the emitted sitemap file, at the docs root.
pub const SITEMAP_FILENAME: &str = "sitemap.xml";

const XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("docs directory not found: {0}")]
    MissingDocsDir(String),
}

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// Last-modified date (`YYYY-MM-DD`) for a file: git commit date first,
/// filesystem mtime second, today as the final fallback.
pub fn last_modified(path: &Path) -> String {
    if let Some(date) = git_commit_date(path) {
        return date;
    }
    if let Ok(meta) = fs::metadata(path)
        && let Ok(mtime) = meta.modified()
    {
        let dt: DateTime<Local> = mtime.into();
        return dt.format("%Y-%m-%d").to_string();
    }
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Commit date of the last commit touching `path`, if the file is tracked.
fn git_commit_date(path: &Path) -> Option<String> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty())?;
    let output = Command::new("git")
        .args(["log", "-1", "--format=%cI"])
        .arg(path.file_name()?)
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let iso = stdout.trim();
    if iso.is_empty() {
        return None;
    }
    // ISO 8601 commit date; keep the date part only.
    Some(iso.split('T').next()?.to_string())
}

/// Collect sitemap entries for the docs tree: the index page plus every
/// HTML file under `concepts/`, in deterministic path order.
pub fn collect_entries(docs_dir: &Path, base_url: &str) -> Result<Vec<UrlEntry>, SitemapError> {
    if !docs_dir.is_dir() {
        return Err(SitemapError::MissingDocsDir(
            docs_dir.display().to_string(),
        ));
    }
    let base = base_url.trim_end_matches('/');
    let mut entries = vec![UrlEntry {
        loc: format!("{base}/"),
        lastmod: last_modified(&docs_dir.join("index.html")),
        changefreq: "weekly",
        priority: "1.0",
    }];

    let concepts_dir = docs_dir.join("concepts");
    if !concepts_dir.is_dir() {
        return Ok(entries);
    }

    let mut pages: Vec<_> = WalkDir::new(&concepts_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
        .map(|e| e.into_path())
        .collect();
    pages.sort();

    for page in pages {
        let rel = page
            .strip_prefix(docs_dir)
            .unwrap_or(&page)
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");
        // Landing pages live directly in concepts/; concept pages one level
        // deeper, in concepts/{language}/.
        let is_landing = rel.matches('/').count() == 1;
        entries.push(UrlEntry {
            loc: format!("{base}/{rel}"),
            lastmod: last_modified(&page),
            changefreq: if is_landing { "weekly" } else { "monthly" },
            priority: if is_landing { "0.9" } else { "0.8" },
        });
    }
    Ok(entries)
}

/// Render entries to sitemap XML.
pub fn render_sitemap(entries: &[UrlEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{XMLNS}\">");
    for entry in entries {
        let _ = writeln!(xml, "  <url>");
        let _ = writeln!(xml, "    <loc>{}</loc>", xml_escape(&entry.loc));
        let _ = writeln!(xml, "    <lastmod>{}</lastmod>", xml_escape(&entry.lastmod));
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq);
        let _ = writeln!(xml, "    <priority>{}</priority>", entry.priority);
        let _ = writeln!(xml, "  </url>");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Generate and write `sitemap.xml`; returns the number of URLs.
pub fn write_sitemap(docs_dir: &Path, base_url: &str) -> Result<usize, SitemapError> {
    let entries = collect_entries(docs_dir, base_url)?;
    fs::write(docs_dir.join(SITEMAP_FILENAME), render_sitemap(&entries))?;
    Ok(entries.len())
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
