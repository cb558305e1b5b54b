use crate::processing::SegmentationStrategy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing segmentation activity during a run.
#[derive(Default)]
pub struct RunMetrics {
    documents_processed: AtomicU64,
    outline_documents: AtomicU64,
    heuristic_documents: AtomicU64,
    empty_documents: AtomicU64,
    sections_emitted: AtomicU64,
}

impl RunMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a segmented document and the number of sections it produced.
    pub fn record_document(&self, strategy: SegmentationStrategy, section_count: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        let by_strategy = match strategy {
            SegmentationStrategy::OutlineDriven => &self.outline_documents,
            SegmentationStrategy::HeuristicHeading => &self.heuristic_documents,
        };
        by_strategy.fetch_add(1, Ordering::Relaxed);
        if section_count == 0 {
            self.empty_documents.fetch_add(1, Ordering::Relaxed);
        }
        self.sections_emitted
            .fetch_add(section_count, Ordering::Relaxed);
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counter in [
            &self.documents_processed,
            &self.outline_documents,
            &self.heuristic_documents,
            &self.empty_documents,
            &self.sections_emitted,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            outline_documents: self.outline_documents.load(Ordering::Relaxed),
            heuristic_documents: self.heuristic_documents.load(Ordering::Relaxed),
            empty_documents: self.empty_documents.load(Ordering::Relaxed),
            sections_emitted: self.sections_emitted.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of run counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents segmented so far.
    pub documents_processed: u64,
    /// Documents segmented from outline metadata.
    pub outline_documents: u64,
    /// Documents segmented by heading detection.
    pub heuristic_documents: u64,
    /// Documents that contributed no sections.
    pub empty_documents: u64,
    /// Total sections added to the pool.
    pub sections_emitted: u64,
}
