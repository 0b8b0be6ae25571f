pub mod extract;
pub mod fingerprint;
pub mod hint;
pub mod sanitize;
pub mod validate;

pub use extract::{extract, ExtractionStrategy, StrategyConfig};
pub use fingerprint::fingerprint;
pub use hint::ElementHint;
pub use sanitize::{sanitize, Sanitizer};
pub use validate::{is_safe_selector, matches_markup, validates};
