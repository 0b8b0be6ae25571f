//! The self-healing resolver.
//!
//! One resolution request walks the extraction strategies in their fixed
//! escalation order. Per strategy: extract a fragment, sanitize it,
//! fingerprint it, consult the cache, gate on the call budget, ask the
//! model, parse and validate the answer against the live page, cache the
//! win. Every failure inside the loop only advances to the next strategy;
//! the caller sees either a validated locator or a clean "not found".

use crate::backend::MarkupSource;
use crate::cache::ResolutionCache;
use crate::config::HealingConfig;
use crate::limiter::RateLimiter;
use crate::model::ModelClient;
use crate::prompt::{build_prompt, extract_candidate};
use mend_core::extract::{extract, ExtractionStrategy};
use mend_core::fingerprint::fingerprint;
use mend_core::hint::ElementHint;
use mend_core::sanitize::Sanitizer;
use mend_core::validate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one resolution request. Never carries a locator that has not
/// passed DOM validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealOutcome {
    /// A validated locator for the element.
    Healed(String),
    /// All strategies exhausted (or healing disabled). `attempted` lists
    /// the strategies tried, in order.
    NotFound { attempted: Vec<String> },
}

impl HealOutcome {
    pub fn locator(&self) -> Option<&str> {
        match self {
            HealOutcome::Healed(locator) => Some(locator),
            HealOutcome::NotFound { .. } => None,
        }
    }
}

/// Escalating locator resolver. All shared state (cache, rate limiter,
/// model client) is constructor-injected, so independent instances can
/// coexist (one per test worker) and unit tests can swap in mocks.
pub struct SelfHealer {
    cache: Arc<ResolutionCache>,
    limiter: Arc<RateLimiter>,
    model: Arc<dyn ModelClient>,
    sanitizer: Sanitizer,
    strategies: Vec<ExtractionStrategy>,
    enabled: bool,
    redact_full_page: bool,
}

impl SelfHealer {
    pub fn new(
        cache: Arc<ResolutionCache>,
        limiter: Arc<RateLimiter>,
        model: Arc<dyn ModelClient>,
        config: &HealingConfig,
    ) -> Self {
        if !config.redact_full_page {
            warn!("full-page fragments will be sent to the model unredacted");
        }
        Self {
            cache,
            limiter,
            model,
            sanitizer: Sanitizer::new(),
            strategies: ExtractionStrategy::escalation(&config.strategy_config()),
            enabled: config.enabled,
            redact_full_page: config.redact_full_page,
        }
    }

    /// Resolve against the markup supplied by the driver layer.
    pub async fn resolve(
        &self,
        element_name: &str,
        previous_locator: Option<&str>,
        source: &mut dyn MarkupSource,
    ) -> HealOutcome {
        if !self.enabled {
            return HealOutcome::NotFound { attempted: vec![] };
        }
        let markup = match source.current_markup().await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("markup source failed, cannot heal '{}': {}", element_name, e);
                return HealOutcome::NotFound { attempted: vec![] };
            }
        };
        let hint = ElementHint::new(element_name, previous_locator);
        self.resolve_with_markup(&hint, &markup).await
    }

    /// Resolve against an already captured markup snapshot.
    pub async fn resolve_with_markup(&self, hint: &ElementHint, markup: &str) -> HealOutcome {
        if !self.enabled {
            debug!("self-healing disabled, skipping '{}'", hint.name);
            return HealOutcome::NotFound { attempted: vec![] };
        }

        let mut attempted = Vec::new();
        for strategy in &self.strategies {
            attempted.push(strategy.name().to_string());
            if let Some(locator) = self.attempt(hint, markup, strategy).await {
                info!(
                    "healed '{}' via {} strategy: {}",
                    hint.name,
                    strategy.name(),
                    locator
                );
                return HealOutcome::Healed(locator);
            }
        }

        info!("could not heal '{}': all strategies exhausted", hint.name);
        HealOutcome::NotFound { attempted }
    }

    /// One strategy attempt. `None` means "this strategy failed", for any
    /// reason; the escalation loop carries on.
    async fn attempt(
        &self,
        hint: &ElementHint,
        markup: &str,
        strategy: &ExtractionStrategy,
    ) -> Option<String> {
        let fragment = extract(markup, hint, strategy);
        let fragment = if strategy.is_full() && !self.redact_full_page {
            fragment
        } else {
            self.sanitizer.sanitize(&fragment)
        };

        let fragment_fp = fingerprint(&fragment);
        if let Some(cached) = self.cache.get(&hint.name, &fragment_fp) {
            debug!("cache hit for '{}' ({})", hint.name, strategy.name());
            return Some(cached);
        }

        if !self.limiter.try_acquire() {
            warn!(
                "model call budget exhausted, skipping {} strategy for '{}'",
                strategy.name(),
                hint.name
            );
            return None;
        }

        let prompt = build_prompt(hint, &fragment);
        let answer = match self.model.chat(&prompt, strategy.timeout()).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(
                    "model call failed for '{}' ({}): {}",
                    hint.name,
                    strategy.name(),
                    e
                );
                return None;
            }
        };

        let candidate = extract_candidate(&answer)?;
        if !validate::is_safe_selector(&candidate) {
            warn!(
                "candidate for '{}' rejected by selector whitelist: {}",
                hint.name, candidate
            );
            return None;
        }

        // Ground truth lives in the original markup, not the redacted
        // fragment the model saw.
        if !validate::matches_markup(&candidate, markup) {
            debug!(
                "candidate for '{}' does not match the page ({}): {}",
                hint.name,
                strategy.name(),
                candidate
            );
            return None;
        }

        self.cache.put(&hint.name, &fragment_fp, &candidate);
        Some(candidate)
    }
}
