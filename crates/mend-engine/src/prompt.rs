//! Prompt assembly and model-answer parsing.

use mend_core::hint::ElementHint;

/// Fence language tags a model is likely to wrap a selector answer in.
const FENCE_TAGS: &[&str] = &["css", "html", "selector", "text", "txt"];

/// Build the chat prompt for one strategy attempt. The fragment is expected
/// to be sanitized already; this function does not redact.
pub fn build_prompt(hint: &ElementHint, fragment: &str) -> String {
    let previous = hint.previous_locator.as_deref().unwrap_or("none");
    format!(
        "A UI test can no longer find one of its elements. Propose a CSS selector \
         that locates it in the markup below.\n\n\
         Element: {}\n\
         Previous selector (no longer matching): {}\n\n\
         Page markup:\n{}\n\n\
         Answer with exactly one CSS selector and nothing else.",
        hint.name, previous, fragment
    )
}

/// Pull a single candidate selector out of a free-text answer: the first
/// fenced code block when present, otherwise the trimmed answer itself, with
/// stray backticks and quote wrappers removed. `None` when nothing usable
/// remains.
pub fn extract_candidate(answer: &str) -> Option<String> {
    let body = fenced_block(answer).unwrap_or_else(|| answer.trim().to_string());
    let line = body.lines().map(str::trim).find(|l| !l.is_empty())?;
    let cleaned = line
        .trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn fenced_block(answer: &str) -> Option<String> {
    let start = answer.find("```")?;
    let rest = &answer[start + 3..];
    let end = rest.find("```")?;
    let block = &rest[..end];
    // drop a language tag on the opening fence ("```css")
    if let Some((first, tail)) = block.split_once('\n') {
        if FENCE_TAGS.contains(&first.trim()) {
            return Some(tail.to_string());
        }
    }
    Some(block.to_string())
}
