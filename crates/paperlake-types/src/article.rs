//! Article records for the bronze and silver layers.
//!
//! Bronze objects are append-only: once an envelope is written it is never
//! mutated or deleted. Silver objects are created at most once per id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single author of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A raw article as returned by the external source.
///
/// The `id` is source-assigned; when the source markup carries no usable
/// identifier the fetcher synthesizes `unknown_<offset+index>` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub authors: Vec<Author>,
    pub summary: String,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub categories: Vec<String>,
    pub link: String,
    #[serde(default)]
    pub pdf_link: Option<String>,
}

impl Article {
    /// The object key this article is stored under in both layers.
    pub fn object_key(&self) -> String {
        format!("{}.json", self.id)
    }
}

/// The literal bronze-stored object: an article plus ingestion provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEnvelope {
    pub ingestion_timestamp: DateTime<Utc>,
    pub ingestion_source: String,
    pub search_query: String,
    pub article_data: Article,
}

impl RawEnvelope {
    /// Wrap an article for bronze storage, stamped with the current time.
    pub fn new(source: impl Into<String>, query: impl Into<String>, article: Article) -> Self {
        Self {
            ingestion_timestamp: Utc::now(),
            ingestion_source: source.into(),
            search_query: query.into(),
            article_data: article,
        }
    }
}

/// A fully processed article as stored in the silver layer.
///
/// `cleaned_summary` is derived deterministically from `summary`, and
/// `embedding` always has the embedding model's declared dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedArticle {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub cleaned_summary: String,
    pub embedding: Vec<f32>,
    pub categories: Vec<String>,
    pub published: DateTime<Utc>,
}

impl ProcessedArticle {
    pub fn object_key(&self) -> String {
        format!("{}.json", self.id)
    }
}
