//! # paperlake-types
//!
//! Shared domain types for the PaperLake pipeline.
//!
//! This crate defines the records that flow through the two-stage
//! medallion pipeline:
//! - `Article`: a raw record as returned by the external source
//! - `RawEnvelope`: the bronze-stored object wrapping an article with
//!   ingestion provenance
//! - `ProcessedArticle`: the silver-stored object with cleaned text and
//!   embedding vector
//!
//! plus the layered `Settings` used by the daemon and service.

pub mod article;
pub mod config;

pub use article::{Article, Author, ProcessedArticle, RawEnvelope};
pub use config::{ConfigError, IngestionSettings, ModelSettings, ProcessingSettings, Settings};
