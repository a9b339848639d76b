//! # paperlake-source
//!
//! Paginated article source for the ingestion pipeline.
//!
//! The orchestrator depends on the [`ArticleSource`] trait; [`ArxivSource`]
//! implements it against arXiv's HTML search results. Pagination is by
//! records returned, not records requested: short or merged pages never
//! skip articles.

pub mod arxiv;
pub mod error;
pub mod source;

pub use arxiv::ArxivSource;
pub use error::SourceError;
pub use source::ArticleSource;
