//! Source error taxonomy.

use thiserror::Error;

/// Errors raised by an article source.
///
/// `RateLimited` is transient: the fetcher has already waited before
/// surfacing it. `Http` and `Parse` signal protocol-level breakage
/// (unexpected status, changed page layout).
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source rate limit hit; the fetcher paused before returning this.
    #[error("Source rate limit reached")]
    RateLimited,

    /// Unexpected HTTP status from the source.
    #[error("Source returned HTTP {0}")]
    Http(u16),

    /// Page layout did not match expectations.
    #[error("Failed to parse source page: {0}")]
    Parse(String),

    /// Transport-level failure (connect, timeout, body read).
    #[error("Source request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl SourceError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
