//! Outline lookup: find precomputed heading metadata for a document.
//!
//! An outline store maps a document's base name to a JSON file shaped like
//! `{ "outline": [{ "text": "...", "page": 1 }, ...] }`. Extra fields are ignored. Lookup tries a
//! few spelling variants of the base name and stops at the first one the store knows.

use super::types::{Heading, OutlineError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Source of raw outline documents keyed by base name.
pub trait OutlineStore {
    /// Return the raw JSON stored under `key`, or `None` when nothing is stored there.
    fn fetch(&self, key: &str) -> Result<Option<String>, OutlineError>;
}

/// Outline store backed by `<root>/<key>.json` files.
#[derive(Debug, Clone)]
pub struct DirectoryOutlineStore {
    root: PathBuf,
}

impl DirectoryOutlineStore {
    /// Create a store reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl OutlineStore for DirectoryOutlineStore {
    fn fetch(&self, key: &str) -> Result<Option<String>, OutlineError> {
        let path = self.root.join(format!("{key}.json"));
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| OutlineError::Io { path, source })
    }
}

/// Store used when no outline directory is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOutlines;

impl OutlineStore for NoOutlines {
    fn fetch(&self, _key: &str) -> Result<Option<String>, OutlineError> {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct OutlineFile {
    #[serde(default)]
    outline: Vec<Heading>,
}

/// Candidate store keys for a document file name, in probe order and without duplicates.
///
/// The extension is stripped, then the base name is tried as-is, with spaces replaced by
/// underscores, and with underscores replaced by spaces.
pub fn candidate_keys(document_name: &str) -> Vec<String> {
    let stem = Path::new(document_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(document_name);

    let mut keys: Vec<String> = Vec::with_capacity(3);
    for key in [
        stem.to_string(),
        stem.replace(' ', "_"),
        stem.replace('_', " "),
    ] {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Parse raw outline JSON into headings.
pub fn parse_outline(key: &str, raw: &str) -> Result<Vec<Heading>, OutlineError> {
    let file: OutlineFile =
        serde_json::from_str(raw).map_err(|source| OutlineError::Malformed {
            key: key.to_string(),
            source,
        })?;

    if let Some(heading) = file.outline.iter().find(|heading| heading.page == 0) {
        return Err(OutlineError::InvalidPage {
            key: key.to_string(),
            title: heading.title.clone(),
        });
    }
    Ok(file.outline)
}

/// Resolve a document's outline.
///
/// The first key the store knows wins; later variants are not consulted even when the hit turns
/// out to be unusable. Unreadable or malformed outlines are logged and reported as absent so the
/// caller falls back to heading detection.
pub fn resolve(store: &dyn OutlineStore, document_name: &str) -> Option<Vec<Heading>> {
    for key in candidate_keys(document_name) {
        let raw = match store.fetch(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(error) => {
                tracing::warn!(document = document_name, %error, "Outline unreadable; ignoring");
                return None;
            }
        };

        return match parse_outline(&key, &raw) {
            Ok(headings) => {
                tracing::debug!(
                    document = document_name,
                    key = %key,
                    headings = headings.len(),
                    "Resolved outline"
                );
                Some(headings)
            }
            Err(error) => {
                tracing::warn!(document = document_name, %error, "Outline malformed; ignoring");
                None
            }
        };
    }
    None
}
