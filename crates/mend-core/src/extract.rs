//! Context extraction: carve a bounded fragment out of the page markup.
//!
//! The resolver escalates through three strategies. Compact emits local
//! snippets around keyword matches, Expanded emits the enclosing semantic
//! container, Full passes the page through verbatim. Compact and Expanded
//! never exceed their character budget; any internal failure degrades to a
//! plain truncation of the full markup instead of raising.

use crate::hint::ElementHint;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// Tags that never carry the content we are looking for.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "head", "meta", "link", "title", "noscript"];

/// Attributes searched for hint keywords during node discovery.
const SEARCH_ATTRS: &[&str] = &["id", "name", "class", "data-test-id", "data-testid", "aria-label"];

/// Attributes kept when rendering a snippet's parent opening tag.
const PARENT_ATTRS: &[&str] = &["id", "class", "name", "data-test-id", "role", "type"];

/// Budgets and timeouts for the three extraction tiers.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub compact_max_chars: usize,
    pub compact_timeout: Duration,
    pub expanded_max_chars: usize,
    pub expanded_timeout: Duration,
    pub full_timeout: Duration,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            compact_max_chars: 2_000,
            compact_timeout: Duration::from_secs(10),
            expanded_max_chars: 8_000,
            expanded_timeout: Duration::from_secs(20),
            full_timeout: Duration::from_secs(45),
        }
    }
}

/// One tier of context extraction.
///
/// The three tiers form a closed, ordered set: Compact, then Expanded, then
/// Full. Escalation never skips or reorders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Local snippets around keyword matches, small budget, short timeout.
    Compact { max_chars: usize, timeout: Duration },
    /// The enclosing semantic container of the first match, medium budget.
    Expanded { max_chars: usize, timeout: Duration },
    /// The whole page, unbounded, long timeout.
    Full { timeout: Duration },
}

impl ExtractionStrategy {
    /// The fixed escalation order for one resolution request.
    pub fn escalation(config: &StrategyConfig) -> Vec<ExtractionStrategy> {
        vec![
            ExtractionStrategy::Compact {
                max_chars: config.compact_max_chars,
                timeout: config.compact_timeout,
            },
            ExtractionStrategy::Expanded {
                max_chars: config.expanded_max_chars,
                timeout: config.expanded_timeout,
            },
            ExtractionStrategy::Full {
                timeout: config.full_timeout,
            },
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::Compact { .. } => "compact",
            ExtractionStrategy::Expanded { .. } => "expanded",
            ExtractionStrategy::Full { .. } => "full",
        }
    }

    /// Character budget for the emitted fragment; `None` means unbounded.
    pub fn char_budget(&self) -> Option<usize> {
        match self {
            ExtractionStrategy::Compact { max_chars, .. }
            | ExtractionStrategy::Expanded { max_chars, .. } => Some(*max_chars),
            ExtractionStrategy::Full { .. } => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        match self {
            ExtractionStrategy::Compact { timeout, .. }
            | ExtractionStrategy::Expanded { timeout, .. }
            | ExtractionStrategy::Full { timeout } => *timeout,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, ExtractionStrategy::Full { .. })
    }
}

/// Extract a fragment of `full_markup` for the given hint and strategy.
///
/// Full returns the markup verbatim. Compact and Expanded stay within the
/// strategy's character budget and fall back to a plain truncation of the
/// full markup when nothing better can be assembled.
pub fn extract(full_markup: &str, hint: &ElementHint, strategy: &ExtractionStrategy) -> String {
    match strategy {
        ExtractionStrategy::Full { .. } => full_markup.to_string(),
        ExtractionStrategy::Compact { max_chars, .. } => {
            extract_compact(full_markup, hint, *max_chars)
                .unwrap_or_else(|| truncate_chars(full_markup, *max_chars))
        }
        ExtractionStrategy::Expanded { max_chars, .. } => {
            extract_expanded(full_markup, hint, *max_chars)
                .unwrap_or_else(|| truncate_chars(full_markup, *max_chars))
        }
    }
}

/// Compact tier: a snippet per matched node, concatenated up to the budget.
/// Snippets are never truncated mid-way; once the next one would overflow,
/// assembly stops.
fn extract_compact(markup: &str, hint: &ElementHint, budget: usize) -> Option<String> {
    let doc = Html::parse_document(markup);
    let matches = discover(&doc, hint);
    if matches.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut used = 0;
    for el in matches {
        let snippet = local_snippet(el);
        let cost = snippet.chars().count() + if out.is_empty() { 0 } else { 1 };
        if used + cost > budget {
            break;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&snippet);
        used += cost;
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Expanded tier: the semantic container enclosing the first match,
/// truncated at the budget.
fn extract_expanded(markup: &str, hint: &ElementHint, budget: usize) -> Option<String> {
    let doc = Html::parse_document(markup);
    let matches = discover(&doc, hint);
    let container = matches
        .first()
        .and_then(|el| semantic_container(*el))
        .or_else(|| main_content_area(&doc))?;
    Some(truncate_chars(&container.html(), budget))
}

/// Node discovery shared by Compact and Expanded: own text first, then
/// identifying attributes, then the generic main-content fallback.
fn discover<'a>(doc: &'a Html, hint: &ElementHint) -> Vec<ElementRef<'a>> {
    let keywords = hint.keywords();
    let mut matches = find_by_text(doc, &keywords);
    if matches.is_empty() {
        matches = find_by_attributes(doc, &keywords);
    }
    if matches.is_empty() {
        matches = main_content_area(doc).into_iter().collect();
    }
    matches
}

fn all_elements(doc: &Html) -> Vec<ElementRef<'_>> {
    match Selector::parse("*") {
        Ok(sel) => doc.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

/// Text directly inside the element, excluding descendant elements.
fn own_text(el: &ElementRef) -> String {
    let mut text = String::new();
    for child in el.children() {
        if let Some(t) = child.value().as_text() {
            text.push_str(&t.text);
        }
    }
    text
}

fn is_content_element(el: &ElementRef) -> bool {
    !NON_CONTENT_TAGS.contains(&el.value().name())
}

fn find_by_text<'a>(doc: &'a Html, keywords: &[String]) -> Vec<ElementRef<'a>> {
    if keywords.is_empty() {
        return Vec::new();
    }
    all_elements(doc)
        .into_iter()
        .filter(is_content_element)
        .filter(|el| {
            let text = own_text(el).to_lowercase();
            keywords.iter().any(|k| text.contains(k.as_str()))
        })
        .collect()
}

fn find_by_attributes<'a>(doc: &'a Html, keywords: &[String]) -> Vec<ElementRef<'a>> {
    if keywords.is_empty() {
        return Vec::new();
    }
    all_elements(doc)
        .into_iter()
        .filter(is_content_element)
        .filter(|el| {
            SEARCH_ATTRS.iter().any(|attr| {
                el.value()
                    .attr(attr)
                    .map(|v| {
                        let v = v.to_lowercase();
                        keywords.iter().any(|k| v.contains(k.as_str()))
                    })
                    .unwrap_or(false)
            })
        })
        .collect()
}

/// First `main`/`article`/`[role=main]` node, else the first form, else the
/// first container-classed block.
fn main_content_area(doc: &Html) -> Option<ElementRef<'_>> {
    for selector in ["main", "article", "[role=\"main\"]", "form"] {
        if let Ok(sel) = Selector::parse(selector) {
            if let Some(el) = doc.select(&sel).next() {
                return Some(el);
            }
        }
    }
    all_elements(doc)
        .into_iter()
        .find(|el| has_container_class(el))
}

fn has_container_class(el: &ElementRef) -> bool {
    el.value()
        .attr("class")
        .map(|c| {
            let c = c.to_lowercase();
            c.contains("container") || c.contains("content")
        })
        .unwrap_or(false)
}

/// Nearest ancestor that reads as a semantic container.
fn semantic_container(el: ElementRef) -> Option<ElementRef> {
    el.ancestors().filter_map(ElementRef::wrap).find(|a| {
        matches!(a.value().name(), "form" | "section" | "article" | "main")
            || has_container_class(a)
    })
}

/// A matched node with its immediate surroundings: the parent's opening tag
/// (whitelisted attributes only), the nearest sibling on each side, the node
/// itself, and the parent's closing tag.
fn local_snippet(el: ElementRef) -> String {
    let mut out = String::new();
    let parent = el.parent().and_then(ElementRef::wrap);

    if let Some(p) = &parent {
        out.push_str(&open_tag(p));
        out.push('\n');
    }
    if let Some(prev) = el.prev_siblings().find_map(ElementRef::wrap) {
        out.push_str(&prev.html());
        out.push('\n');
    }
    out.push_str(&el.html());
    if let Some(next) = el.next_siblings().find_map(ElementRef::wrap) {
        out.push('\n');
        out.push_str(&next.html());
    }
    if let Some(p) = &parent {
        out.push('\n');
        out.push_str(&format!("</{}>", p.value().name()));
    }
    out
}

fn open_tag(el: &ElementRef) -> String {
    let value = el.value();
    let mut tag = format!("<{}", value.name());
    for attr in PARENT_ATTRS {
        if let Some(v) = value.attr(attr) {
            tag.push_str(&format!(" {}=\"{}\"", attr, v));
        }
    }
    tag.push('>');
    tag
}

/// Character-safe prefix truncation.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}
