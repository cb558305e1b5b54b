//! Page text sources: turn a document on disk into per-page text.

use crate::processing::SourceError;
use std::path::Path;

/// Random access to a document's page text.
pub trait DocumentPages {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;
    /// Text of the 1-based `page`; empty when the page has no text or does not exist.
    fn page_text(&self, page: usize) -> String;
}

/// Opens documents of the formats it understands.
pub trait PageTextSource {
    /// Whether the file at `path` is a document this source can open.
    fn accepts(&self, path: &Path) -> bool;
    /// Load the document at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentPages>, SourceError>;
}

/// Document whose pages are already extracted into memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagedText {
    pages: Vec<String>,
}

impl PagedText {
    /// Wrap pages in document order; index 0 is page 1.
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

impl<S: Into<String>> FromIterator<S> for PagedText {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl DocumentPages for PagedText {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> String {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .cloned()
            .unwrap_or_default()
    }
}

/// PDF source backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageSource;

impl PageTextSource for PdfPageSource {
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn DocumentPages>, SourceError> {
        let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|error| {
            SourceError::Parse {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        })?;
        tracing::debug!(path = %path.display(), pages = pages.len(), "Extracted PDF text");
        Ok(Box::new(PagedText::new(pages)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_text_is_one_based() {
        let doc: PagedText = ["first", "second"].into_iter().collect();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(1), "first");
        assert_eq!(doc.page_text(2), "second");
        assert_eq!(doc.page_text(0), "");
        assert_eq!(doc.page_text(3), "");
    }

    #[test]
    fn pdf_source_accepts_pdf_extension_only() {
        let source = PdfPageSource;
        assert!(source.accepts(Path::new("guide.pdf")));
        assert!(source.accepts(Path::new("GUIDE.PDF")));
        assert!(!source.accepts(Path::new("persona.txt")));
        assert!(!source.accepts(Path::new("pdf")));
    }

    #[test]
    fn pdf_source_reports_unparseable_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").expect("write");

        let error = PdfPageSource.open(&path).err().expect("parse failure");
        assert!(matches!(error, SourceError::Parse { .. }));
    }

    #[test]
    fn pdf_source_reports_missing_files() {
        let error = PdfPageSource
            .open(Path::new("/nonexistent/missing.pdf"))
            .err()
            .expect("io failure");
        assert!(matches!(error, SourceError::Io { .. }));
    }
}
