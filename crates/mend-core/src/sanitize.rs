//! Markup redaction before anything leaves the process boundary.
//!
//! Fragments are scrubbed of email addresses, phone-shaped numbers,
//! secret-looking attribute values and card-shaped digit runs before they
//! are sent to the external model. Rules run in a fixed order and each one
//! preserves attribute quoting, so the redacted fragment stays structurally
//! valid markup.

use lazy_static::lazy_static;
use regex::Regex;

pub const EMAIL_PLACEHOLDER: &str = "[email]";
pub const PHONE_PLACEHOLDER: &str = "[phone]";
pub const SECRET_PLACEHOLDER: &str = "[redacted]";
pub const CARD_PLACEHOLDER: &str = "[card]";

/// A single compiled redaction rule.
struct Rule {
    regex: Regex,
    replacement: String,
}

/// Ordered redaction rules over a markup fragment.
///
/// Patterns are compiled once at construction; a pattern that fails to
/// compile is skipped, leaving the input unchanged for that rule only.
/// `sanitize` itself never fails and is idempotent.
pub struct Sanitizer {
    rules: Vec<Rule>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        // Order matters: emails, then phones, then secret attributes, then
        // card numbers, exactly the sequence the redaction contract fixes.
        let patterns: Vec<(&str, String)> = vec![
            (
                r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
                EMAIL_PLACEHOLDER.to_string(),
            ),
            (
                r"\b\+?\d{0,2}[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
                PHONE_PLACEHOLDER.to_string(),
            ),
            (
                r#"(?i)([a-z0-9_-]*(?:password|secret|token|api[-_]?key|auth|session)[a-z0-9_-]*\s*=\s*)"[^"]*""#,
                format!("${{1}}\"{}\"", SECRET_PLACEHOLDER),
            ),
            (
                r"(?i)([a-z0-9_-]*(?:password|secret|token|api[-_]?key|auth|session)[a-z0-9_-]*\s*=\s*)'[^']*'",
                format!("${{1}}'{}'", SECRET_PLACEHOLDER),
            ),
            (
                r"\b\d(?:[ -]?\d){12,18}\b",
                CARD_PLACEHOLDER.to_string(),
            ),
        ];

        let rules = patterns
            .into_iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|regex| Rule { regex, replacement })
            })
            .collect();

        Self { rules }
    }

    /// Redact a markup fragment. Deterministic, pure, never fails.
    pub fn sanitize(&self, fragment: &str) -> String {
        let mut out = fragment.to_string();
        for rule in &self.rules {
            out = rule
                .regex
                .replace_all(&out, rule.replacement.as_str())
                .into_owned();
        }
        out
    }
}

lazy_static! {
    static ref SANITIZER: Sanitizer = Sanitizer::new();
}

/// Redact a fragment using a shared compiled-rule instance.
pub fn sanitize(fragment: &str) -> String {
    SANITIZER.sanitize(fragment)
}
