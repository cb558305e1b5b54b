//! Extraction pipeline: normalization, outline lookup, segmentation, ranking, and reporting.

pub mod heading;
pub mod normalize;
pub mod outline;
pub mod rank;
pub mod report;
pub mod segment;
mod service;
pub mod types;

pub use service::{
    DEFAULT_PERSONA, DEFAULT_TASK, ExtractionService, PERSONA_FILE, RunRequest, TASK_FILE,
};
pub use types::{
    Heading, OutlineError, PipelineError, RankedSection, RankingError, Section,
    SegmentationStrategy, SourceError,
};
