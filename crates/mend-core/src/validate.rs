//! Candidate locator validation.
//!
//! A model answer is never trusted as-is: the selector must pass a character
//! whitelist (no script-injection markers, no characters outside ordinary
//! CSS syntax) and then actually match at least one node in the live page
//! markup. Both checks are total; malformed selectors and unparseable
//! markup come back as `false`, never as an error.

use scraper::{Html, Selector};

/// Punctuation permitted in a candidate selector besides alphanumerics and
/// whitespace.
const SELECTOR_PUNCTUATION: &str = "#.-_*[]()='\":>+~^$|,";

/// Markers that disqualify a candidate before any DOM query is attempted.
const INJECTION_MARKERS: &[&str] = &["javascript:", "<script"];

/// Syntax gate: whitelisted characters only, no injection markers.
pub fn is_safe_selector(candidate: &str) -> bool {
    if candidate.trim().is_empty() {
        return false;
    }
    let lowered = candidate.to_lowercase();
    if INJECTION_MARKERS.iter().any(|m| lowered.contains(m)) {
        return false;
    }
    candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || SELECTOR_PUNCTUATION.contains(c))
}

/// True iff the selector parses and matches at least one node in `markup`.
pub fn matches_markup(candidate: &str, markup: &str) -> bool {
    let selector = match Selector::parse(candidate) {
        Ok(s) => s,
        Err(_) => return false,
    };
    let doc = Html::parse_document(markup);
    doc.select(&selector).next().is_some()
}

/// Full validation: syntax gate first, DOM query second.
pub fn validates(candidate: &str, markup: &str) -> bool {
    is_safe_selector(candidate) && matches_markup(candidate, markup)
}
