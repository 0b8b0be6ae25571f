pub mod backend;
pub mod cache;
pub mod config;
pub mod limiter;
pub mod model;
pub mod prompt;
pub mod resolver;

pub use mend_core::extract::{extract, ExtractionStrategy, StrategyConfig};
pub use mend_core::hint::ElementHint;
pub use mend_core::sanitize;

pub use backend::{MarkupSource, SourceError};
pub use cache::ResolutionCache;
pub use config::{ConfigLoader, HealingConfig, MendConfig, ModelConfig};
pub use limiter::RateLimiter;
pub use model::{HttpModelClient, ModelClient, ModelError};
pub use resolver::{HealOutcome, SelfHealer};
