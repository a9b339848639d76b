//! Article source contract.

use async_trait::async_trait;

use paperlake_types::Article;

use crate::error::SourceError;

/// Paginated external source of articles.
///
/// Implementations absorb their own rate-limit signals (they may wait
/// before returning) and surface anything unrecoverable as a typed error.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Stable identifier recorded in the ingestion envelope
    /// (e.g. "arxiv_html").
    fn source_name(&self) -> &str;

    /// The source's natural page size; the ingestion loop fetches in
    /// pages of this size.
    fn page_size(&self) -> usize;

    /// Fetch up to `limit` articles starting at `offset`.
    ///
    /// An empty result means the source is exhausted for this query.
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Article>, SourceError>;
}
