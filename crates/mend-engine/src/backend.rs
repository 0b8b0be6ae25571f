//! The driver seam: where the current page markup comes from.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("driver error: {0}")]
    Driver(String),

    #[error("no page is currently loaded")]
    NoPage,
}

/// Supplies the full markup of the page under test. Implemented by the
/// browser/mobile driver layer; the resolver treats it as opaque.
#[async_trait]
pub trait MarkupSource: Send + Sync {
    async fn current_markup(&mut self) -> Result<String, SourceError>;
}
