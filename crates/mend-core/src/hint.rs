//! Element hints: what the caller knows about the element it lost.

/// Words too generic to narrow a markup search.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "of", "to", "in", "on", "for", "with", "and", "or", "by", "at", "is", "this",
    "that", "my", "your",
];

/// Caller-supplied description of an element whose locator stopped matching.
///
/// Immutable once constructed; the resolver never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHint {
    /// Human-readable element name ("Login Button", "Email field").
    pub name: String,
    /// The last known locator, now failing. `None` when nothing was stored.
    pub previous_locator: Option<String>,
}

impl ElementHint {
    pub fn new(name: impl Into<String>, previous_locator: Option<&str>) -> Self {
        Self {
            name: name.into(),
            previous_locator: previous_locator.map(|s| s.to_string()),
        }
    }

    /// Derive search keywords from the element name.
    ///
    /// Lowercased, stripped of non-alphanumeric characters, with stop-words
    /// and single-character tokens dropped. Order-preserving, deduplicated.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords = Vec::new();
        for token in self.name.to_lowercase().split_whitespace() {
            let cleaned: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
            if cleaned.len() < 2 || STOP_WORDS.contains(&cleaned.as_str()) {
                continue;
            }
            if !keywords.contains(&cleaned) {
                keywords.push(cleaned);
            }
        }
        keywords
    }
}
