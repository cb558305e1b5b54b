//! Section segmentation.
//!
//! Two strategies split a document into sections:
//!
//! - Outline-driven: headings from outline metadata define page ranges. Each heading owns the
//!   pages from its own page up to the page before the next heading, and the last heading runs to
//!   the end of the document. Ranges never overlap and cover every page from the first heading on.
//! - Heuristic-heading: with no outline, lines are scanned in order and a
//!   [`HeadingClassifier`] decides which ones open a new section. Text before the first detected
//!   heading is dropped.
//!
//! Both strategies discard sections whose text is empty.

use super::heading::HeadingClassifier;
use super::normalize::normalize;
use super::types::{Heading, Section, SegmentationStrategy};
use crate::source::DocumentPages;

/// Splits documents into sections.
pub struct SectionSegmenter<'a> {
    classifier: &'a dyn HeadingClassifier,
}

impl<'a> SectionSegmenter<'a> {
    /// Create a segmenter using `classifier` for documents without an outline.
    pub fn new(classifier: &'a dyn HeadingClassifier) -> Self {
        Self { classifier }
    }

    /// Segment `pages`, choosing the strategy from whether an outline is present.
    pub fn segment(
        &self,
        document: &str,
        pages: &dyn DocumentPages,
        outline: Option<&[Heading]>,
    ) -> (SegmentationStrategy, Vec<Section>) {
        match outline {
            Some(headings) => (
                SegmentationStrategy::OutlineDriven,
                segment_by_outline(document, pages, headings),
            ),
            None => (
                SegmentationStrategy::HeuristicHeading,
                self.segment_by_headings(document, pages),
            ),
        }
    }

    /// Heuristic-heading strategy.
    pub fn segment_by_headings(&self, document: &str, pages: &dyn DocumentPages) -> Vec<Section> {
        let mut machine = HeadingStateMachine::new(document);
        for page in 1..=pages.page_count() {
            let text = pages.page_text(page);
            for line in text.lines() {
                if self.classifier.is_heading(line) {
                    machine.on_heading(line, page);
                } else {
                    machine.on_body(line);
                }
            }
        }
        machine.finish()
    }
}

/// Outline-driven strategy.
///
/// Headings are sorted by page (stable, so headings sharing a page keep their input order). A
/// heading whose range is empty, such as the earlier of two headings on the same page or one past
/// the last page, yields no text and is dropped.
pub fn segment_by_outline(
    document: &str,
    pages: &dyn DocumentPages,
    headings: &[Heading],
) -> Vec<Section> {
    let last_page = pages.page_count();
    let mut sorted: Vec<&Heading> = headings.iter().collect();
    sorted.sort_by_key(|heading| heading.page);

    let next_starts = sorted
        .iter()
        .skip(1)
        .map(|heading| heading.page)
        .chain(std::iter::once(last_page + 1));

    sorted
        .iter()
        .zip(next_starts)
        .filter_map(|(heading, next_start)| {
            let start_page = heading.page;
            let end_page = next_start.saturating_sub(1).min(last_page);
            let text = join_pages(pages, start_page, end_page);
            if text.is_empty() {
                tracing::debug!(
                    document,
                    title = %heading.title,
                    start_page,
                    end_page,
                    "Dropping outline section without text"
                );
                return None;
            }
            Some(Section {
                document: document.to_string(),
                title: heading.title.clone(),
                start_page,
                text,
            })
        })
        .collect()
}

fn join_pages(pages: &dyn DocumentPages, start_page: usize, end_page: usize) -> String {
    let mut text = String::new();
    for page in start_page..=end_page {
        let normalized = normalize(&pages.page_text(page));
        if normalized.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&normalized);
    }
    text
}

/// Section being accumulated by the heading state machine.
#[derive(Debug)]
struct OpenSection {
    title: String,
    start_page: usize,
    text: String,
}

impl OpenSection {
    fn append(&mut self, line: &str) {
        let normalized = normalize(line);
        if normalized.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&normalized);
    }

    fn into_section(self, document: &str) -> Option<Section> {
        if self.text.is_empty() {
            return None;
        }
        Some(Section {
            document: document.to_string(),
            title: self.title,
            start_page: self.start_page,
            text: self.text,
        })
    }
}

#[derive(Debug)]
enum SegmenterState {
    NoOpenSection,
    OpenSection(OpenSection),
}

/// Line-driven state machine behind the heuristic-heading strategy.
struct HeadingStateMachine<'d> {
    document: &'d str,
    state: SegmenterState,
    emitted: Vec<Section>,
}

impl<'d> HeadingStateMachine<'d> {
    fn new(document: &'d str) -> Self {
        Self {
            document,
            state: SegmenterState::NoOpenSection,
            emitted: Vec::new(),
        }
    }

    /// Flush any open section, then open a new one titled by `line`.
    fn on_heading(&mut self, line: &str, page: usize) {
        self.flush();
        self.state = SegmenterState::OpenSection(OpenSection {
            title: normalize(line),
            start_page: page,
            text: String::new(),
        });
    }

    /// Append body text to the open section; ignored before the first heading.
    fn on_body(&mut self, line: &str) {
        if let SegmenterState::OpenSection(open) = &mut self.state {
            open.append(line);
        }
    }

    fn flush(&mut self) {
        if let SegmenterState::OpenSection(open) =
            std::mem::replace(&mut self.state, SegmenterState::NoOpenSection)
        {
            if let Some(section) = open.into_section(self.document) {
                self.emitted.push(section);
            }
        }
    }

    fn finish(mut self) -> Vec<Section> {
        self.flush();
        self.emitted
    }
}
