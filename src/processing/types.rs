//! Core data types and error definitions for the extraction pipeline.

use crate::embedding::EmbeddingClientError;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// One structural marker taken from a document's outline metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Heading {
    /// 1-based page the heading starts on.
    pub page: usize,
    /// Heading text, used verbatim as the section title.
    #[serde(rename = "text")]
    pub title: String,
}

/// A titled, page-bounded span of normalized text from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// File name of the source document.
    pub document: String,
    /// Section title.
    pub title: String,
    /// 1-based page where the section starts.
    pub start_page: usize,
    /// Normalized section body; never empty.
    pub text: String,
}

/// A section with its position in the relevance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSection {
    /// The ranked section.
    pub section: Section,
    /// 1-based rank; 1 is most relevant.
    pub rank: usize,
}

/// Which segmentation strategy produced a document's sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationStrategy {
    /// Page ranges derived from outline metadata.
    OutlineDriven,
    /// Line-level heading detection.
    HeuristicHeading,
}

/// Errors produced while loading a document's pages.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The document could not be read from disk.
    #[error("Failed to read document {path}: {source}")]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document bytes could not be parsed into pages.
    #[error("Failed to extract text from {path}: {message}")]
    Parse {
        /// Document path.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// Errors produced while reading outline metadata.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// The outline file exists but could not be read.
    #[error("Failed to read outline {path}: {source}")]
    Io {
        /// Outline path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The outline JSON did not match the expected shape.
    #[error("Malformed outline '{key}': {source}")]
    Malformed {
        /// Store key the outline was found under.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A heading referenced a page before the first page.
    #[error("Outline '{key}' has heading '{title}' on page 0")]
    InvalidPage {
        /// Store key the outline was found under.
        key: String,
        /// Offending heading text.
        title: String,
    },
}

/// Errors emitted while scoring sections against the query.
#[derive(Debug, Error)]
pub enum RankingError {
    /// The ranker was called with no sections.
    #[error("Cannot rank an empty section pool")]
    EmptyPool,
    /// Embedding provider failed to return vectors.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Provider returned a different number of vectors than inputs.
    #[error("Embedding provider returned {actual} vectors for {expected} inputs")]
    CountMismatch {
        /// Number of inputs sent.
        expected: usize,
        /// Number of vectors received.
        actual: usize,
    },
    /// Section vectors do not share the query vector's dimensionality.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the query vector.
        expected: usize,
        /// Dimension of the offending section vector.
        actual: usize,
    },
}

/// Errors that abort a run before any report is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input directory is missing or unreadable.
    #[error("Input directory unavailable: {path}: {message}")]
    InputUnavailable {
        /// Input directory.
        path: PathBuf,
        /// Diagnostic.
        message: String,
    },
    /// A document could not be opened.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// No document yielded any section.
    #[error("No text extracted from any document")]
    NoSections,
    /// Ranking failed.
    #[error(transparent)]
    Ranking(#[from] RankingError),
    /// The report could not be written.
    #[error("Failed to write report to {path}: {source}")]
    Output {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The report could not be serialised.
    #[error("Failed to serialise report: {0}")]
    Serialize(#[from] serde_json::Error),
}
