//! Centralized name mapping for languages and page URLs.
//!
//! Two distinct transformations live here and must not be confused:
//!
//! - [`safe_name`] maps a language display label to a filesystem-safe
//!   identifier used for cache and content document filenames
//!   (`"Python 3.10"` → `"Python_3_10"`).
//! - [`slugify`] maps any label to a lowercase URL slug used for page paths
//!   (`"Python 3.10"` → `"python-310"`).
//!
//! Both are deterministic total functions; downstream filenames and URLs
//! depend on their exact output, so behavior changes here invalidate every
//! previously published page.

/// Characters replaced by underscores in [`safe_name`].
const UNSAFE_CHARS: &[char] = &['.', ' ', ',', '-', '?', '(', ')', '/', '\\', '#'];

/// Map a language label to a filesystem-safe identifier.
///
/// A fixed table of exact-match overrides is checked first for names whose
/// canonical safe form is not derivable by character substitution. Otherwise
/// each character in the translation table becomes an underscore. Characters
/// outside the table (`+` included) pass through unchanged; existing
/// filenames depend on the exact output.
pub fn safe_name(label: &str) -> String {
    match label {
        "C#" => "csharp".to_string(),
        "C++" => "cpp".to_string(),
        _ => label
            .chars()
            .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
            .collect(),
    }
}

/// Convert a label to a URL-friendly slug: lowercase, drop characters that
/// are not alphanumeric, whitespace or hyphens, then collapse whitespace and
/// hyphen runs into single hyphens.
///
/// `"Datatypes_Primitive types"` → `"datatypes_primitive-types"` (underscores
/// count as word characters and survive, matching published URLs).
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_hyphen = false;
    for c in label.chars() {
        if c.is_whitespace() || c == '-' {
            if !slug.is_empty() {
                pending_hyphen = true;
            }
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        }
        // Other punctuation is dropped without producing a hyphen.
    }
    slug
}

/// Display form of a stored label: underscores back to spaces.
pub fn display_name(label: &str) -> String {
    label.replace('_', " ")
}

/// Title-case each word of a label (used for concept cards on landing pages).
pub fn title_case(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
