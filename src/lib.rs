#![deny(missing_docs)]

//! Persona-driven section extraction and relevance ranking for document batches.

/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Structured logging and tracing setup.
pub mod logging;
/// Segmentation metrics helpers.
pub mod metrics;
/// Section extraction and ranking pipeline.
pub mod processing;
/// Page text extraction from documents.
pub mod source;
