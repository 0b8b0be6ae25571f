//! Configuration schema. Every field has a serde default so a partial (or
//! absent) config file yields a working setup.

use mend_core::extract::StrategyConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MendConfig {
    #[serde(default)]
    pub healing: HealingConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingConfig {
    /// Master switch. When off, resolution short-circuits to "not found"
    /// without touching the page, the cache or the model.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_compact_max_chars")]
    pub compact_max_chars: usize,
    #[serde(default = "default_compact_timeout_ms")]
    pub compact_timeout_ms: u64,
    #[serde(default = "default_expanded_max_chars")]
    pub expanded_max_chars: usize,
    #[serde(default = "default_expanded_timeout_ms")]
    pub expanded_timeout_ms: u64,
    #[serde(default = "default_full_timeout_ms")]
    pub full_timeout_ms: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default = "default_rate_max_calls")]
    pub rate_max_calls: usize,
    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: u64,

    /// Redact the full-page fragment too before it is sent to the model.
    /// Turning this off restores the leak-prone legacy behavior and is
    /// logged as a warning.
    #[serde(default = "default_redact_full_page")]
    pub redact_full_page: bool,
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            compact_max_chars: default_compact_max_chars(),
            compact_timeout_ms: default_compact_timeout_ms(),
            expanded_max_chars: default_expanded_max_chars(),
            expanded_timeout_ms: default_expanded_timeout_ms(),
            full_timeout_ms: default_full_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            rate_max_calls: default_rate_max_calls(),
            rate_window_secs: default_rate_window_secs(),
            redact_full_page: default_redact_full_page(),
        }
    }
}

impl HealingConfig {
    pub fn strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            compact_max_chars: self.compact_max_chars,
            compact_timeout: Duration::from_millis(self.compact_timeout_ms),
            expanded_max_chars: self.expanded_max_chars,
            expanded_timeout: Duration::from_millis(self.expanded_timeout_ms),
            full_timeout: Duration::from_millis(self.full_timeout_ms),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_compact_max_chars() -> usize {
    2_000
}

fn default_compact_timeout_ms() -> u64 {
    10_000
}

fn default_expanded_max_chars() -> usize {
    8_000
}

fn default_expanded_timeout_ms() -> u64 {
    20_000
}

fn default_full_timeout_ms() -> u64 {
    45_000
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_cache_capacity() -> usize {
    256
}

fn default_rate_max_calls() -> usize {
    10
}

fn default_rate_window_secs() -> u64 {
    60
}

fn default_redact_full_page() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "MEND_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_temperature() -> f32 {
    0.0
}
