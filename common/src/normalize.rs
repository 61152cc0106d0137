//! Text and URL normalization shared by all source adapters.

use url::Url;

/// Collapses every whitespace run (newlines and tabs included) into a single
/// space and trims both ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derives a company identifier from a board URL.
///
/// Returns the last path segment, skipping a single trailing slash.
/// `https://boards.greenhouse.io/techcorp/` gives `techcorp`. Query strings
/// and fragments are ignored. Falls back to the host for a bare domain.
pub fn derive_company_from_url(url: &str) -> Option<String> {
    let without_suffix = url.split(['?', '#']).next().unwrap_or(url);
    let path = without_suffix
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_suffix);

    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or_default();
    let candidate = if last.is_empty() {
        segments.next().unwrap_or_default()
    } else {
        last
    };

    let candidate = candidate.trim();
    if candidate.is_empty() {
        None
    } else {
        Some(candidate.to_string())
    }
}

/// Resolves a listing link against the platform base URL.
///
/// Absolute links are returned unchanged; relative ones are joined onto
/// `base`. Returns `None` when the link cannot be resolved or does not point
/// at an http(s) page (`mailto:`, `javascript:` and the like).
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = match Url::parse(href) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(href).ok()?,
        Err(_) => return None,
    };

    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}
