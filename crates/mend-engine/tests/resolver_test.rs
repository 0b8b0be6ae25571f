use async_trait::async_trait;
use mend_core::extract::{extract, ExtractionStrategy};
use mend_core::fingerprint::fingerprint;
use mend_core::hint::ElementHint;
use mend_core::sanitize::sanitize;
use mend_engine::backend::{MarkupSource, SourceError};
use mend_engine::cache::ResolutionCache;
use mend_engine::config::HealingConfig;
use mend_engine::limiter::RateLimiter;
use mend_engine::model::{ModelClient, ModelError};
use mend_engine::resolver::{HealOutcome, SelfHealer};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PAGE: &str = r#"<html><head><title>Checkout</title></head><body>
<nav class="top-nav"><a href="/">Home</a></nav>
<form id="checkout" class="checkout-form">
  <label for="email">Email</label>
  <input id="email" name="email" type="text">
  <button id="place-order" type="submit">Submit</button>
  <div id="ok">Order summary</div>
</form>
<footer><p>fine print</p></footer>
</body></html>"#;

/// Model stub that replays scripted answers and counts calls.
#[derive(Default)]
struct ScriptedModel {
    answers: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(answers: Vec<Result<String, ModelError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn chat(&self, _prompt: &str, _timeout: Duration) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Malformed("script exhausted".into())))
    }
}

struct StaticPage(&'static str);

#[async_trait]
impl MarkupSource for StaticPage {
    async fn current_markup(&mut self) -> Result<String, SourceError> {
        Ok(self.0.to_string())
    }
}

struct BrokenSource;

#[async_trait]
impl MarkupSource for BrokenSource {
    async fn current_markup(&mut self) -> Result<String, SourceError> {
        Err(SourceError::Driver("session gone".into()))
    }
}

fn healer(
    config: &HealingConfig,
    model: Arc<ScriptedModel>,
) -> (SelfHealer, Arc<ResolutionCache>, Arc<RateLimiter>) {
    let cache = Arc::new(ResolutionCache::new(config.cache_ttl(), config.cache_capacity));
    let limiter = Arc::new(RateLimiter::new(config.rate_max_calls, config.rate_window()));
    let resolver = SelfHealer::new(
        Arc::clone(&cache),
        Arc::clone(&limiter),
        model,
        config,
    );
    (resolver, cache, limiter)
}

/// Fingerprint of the sanitized fragment a given strategy tier produces,
/// mirroring what the resolver computes internally.
fn fragment_fp(name: &str, markup: &str, strategy: &ExtractionStrategy) -> String {
    let hint = ElementHint::new(name, None);
    fingerprint(&sanitize(&extract(markup, &hint, strategy)))
}

#[tokio::test]
async fn test_cache_hit_short_circuits_without_model_calls() {
    let config = HealingConfig::default();
    let model = Arc::new(ScriptedModel::new(vec![]));
    let (resolver, cache, _) = healer(&config, Arc::clone(&model));

    let strategies = ExtractionStrategy::escalation(&config.strategy_config());
    let fp = fragment_fp("Login Button", PAGE, &strategies[0]);
    cache.put("Login Button", &fp, "#login-btn");

    let hint = ElementHint::new("Login Button", Some("#stale"));
    let outcome = resolver.resolve_with_markup(&hint, PAGE).await;

    assert_eq!(outcome, HealOutcome::Healed("#login-btn".into()));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_rate_exhaustion_fails_all_strategies_without_model_calls() {
    let config = HealingConfig {
        rate_max_calls: 1,
        ..HealingConfig::default()
    };
    let model = Arc::new(ScriptedModel::new(vec![]));
    let (resolver, _, limiter) = healer(&config, Arc::clone(&model));

    // drain the only slot
    assert!(limiter.try_acquire());

    let hint = ElementHint::new("Submit", None);
    let outcome = resolver.resolve_with_markup(&hint, PAGE).await;

    assert_eq!(
        outcome,
        HealOutcome::NotFound {
            attempted: vec!["compact".into(), "expanded".into(), "full".into()],
        }
    );
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_escalation_caches_under_winning_fragment() {
    let config = HealingConfig::default();
    // compact answer misses the DOM, expanded answer exists
    let model = Arc::new(ScriptedModel::new(vec![
        Ok("#nope".to_string()),
        Ok("#ok".to_string()),
    ]));
    let (resolver, cache, _) = healer(&config, Arc::clone(&model));

    let hint = ElementHint::new("Submit", None);
    let outcome = resolver.resolve_with_markup(&hint, PAGE).await;

    assert_eq!(outcome, HealOutcome::Healed("#ok".into()));
    assert_eq!(model.calls(), 2);

    let strategies = ExtractionStrategy::escalation(&config.strategy_config());
    let compact_fp = fragment_fp("Submit", PAGE, &strategies[0]);
    let expanded_fp = fragment_fp("Submit", PAGE, &strategies[1]);
    assert_ne!(compact_fp, expanded_fp);
    assert_eq!(cache.get("Submit", &expanded_fp), Some("#ok".to_string()));
    assert_eq!(cache.get("Submit", &compact_fp), None);
}

#[tokio::test]
async fn test_disabled_flag_short_circuits() {
    let config = HealingConfig {
        enabled: false,
        ..HealingConfig::default()
    };
    let model = Arc::new(ScriptedModel::new(vec![Ok("#ok".to_string())]));
    let (resolver, cache, _) = healer(&config, Arc::clone(&model));

    let hint = ElementHint::new("Submit", None);
    let outcome = resolver.resolve_with_markup(&hint, PAGE).await;

    assert_eq!(outcome, HealOutcome::NotFound { attempted: vec![] });
    assert_eq!(model.calls(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_model_errors_degrade_to_not_found() {
    let config = HealingConfig::default();
    let model = Arc::new(ScriptedModel::new(vec![
        Err(ModelError::Timeout(Duration::from_secs(10))),
        Err(ModelError::Network("connection reset".into())),
        Err(ModelError::Api {
            status: 500,
            message: "overloaded".into(),
        }),
    ]));
    let (resolver, cache, _) = healer(&config, Arc::clone(&model));

    let hint = ElementHint::new("Submit", None);
    let outcome = resolver.resolve_with_markup(&hint, PAGE).await;

    assert!(outcome.locator().is_none());
    assert_eq!(model.calls(), 3);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_unsafe_candidate_is_rejected_before_dom_query() {
    let config = HealingConfig::default();
    let model = Arc::new(ScriptedModel::new(vec![
        Ok("javascript:alert(1)".to_string()),
        Ok("<script>x</script>".to_string()),
        Ok("#ok".to_string()),
    ]));
    let (resolver, _, _) = healer(&config, Arc::clone(&model));

    let hint = ElementHint::new("Submit", None);
    let outcome = resolver.resolve_with_markup(&hint, PAGE).await;

    // the injection answers fail their strategies; the clean one wins
    assert_eq!(outcome, HealOutcome::Healed("#ok".into()));
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn test_fenced_answer_is_parsed() {
    let config = HealingConfig::default();
    let model = Arc::new(ScriptedModel::new(vec![Ok(
        "The selector is:\n```css\n#place-order\n```".to_string()
    )]));
    let (resolver, _, _) = healer(&config, Arc::clone(&model));

    let hint = ElementHint::new("Submit", Some("#old-submit"));
    let outcome = resolver.resolve_with_markup(&hint, PAGE).await;

    assert_eq!(outcome, HealOutcome::Healed("#place-order".into()));
}

#[tokio::test]
async fn test_resolve_pulls_markup_from_source() {
    let config = HealingConfig::default();
    let model = Arc::new(ScriptedModel::new(vec![Ok("#ok".to_string())]));
    let (resolver, _, _) = healer(&config, Arc::clone(&model));

    let mut source = StaticPage(PAGE);
    let outcome = resolver.resolve("Submit", Some("#gone"), &mut source).await;

    assert_eq!(outcome, HealOutcome::Healed("#ok".into()));
}

#[tokio::test]
async fn test_source_failure_is_not_found() {
    let config = HealingConfig::default();
    let model = Arc::new(ScriptedModel::new(vec![]));
    let (resolver, _, _) = healer(&config, Arc::clone(&model));

    let mut source = BrokenSource;
    let outcome = resolver.resolve("Submit", None, &mut source).await;

    assert_eq!(outcome, HealOutcome::NotFound { attempted: vec![] });
    assert_eq!(model.calls(), 0);
}
