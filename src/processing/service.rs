//! Extraction service coordinating segmentation, ranking, and report assembly.

use crate::{
    embedding::EmbeddingClient,
    metrics::{MetricsSnapshot, RunMetrics},
    processing::{
        heading::HeadingClassifier,
        outline::{self, OutlineStore},
        rank::RelevanceRanker,
        report::{self, Report},
        segment::SectionSegmenter,
        types::{PipelineError, Section},
    },
    source::PageTextSource,
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Persona used when `persona.txt` is missing or blank.
pub const DEFAULT_PERSONA: &str = "Generic Persona";
/// Task used when `job.txt` is missing or blank.
pub const DEFAULT_TASK: &str = "Understand the documents";
/// File holding the persona inside the input directory.
pub const PERSONA_FILE: &str = "persona.txt";
/// File holding the task inside the input directory.
pub const TASK_FILE: &str = "job.txt";

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Directory holding the documents plus optional persona and task files.
    pub input_dir: PathBuf,
    /// Number of ranked sections to keep.
    pub top_k: usize,
}

/// Coordinates a full run: segment every document, rank the pooled sections, build the report.
///
/// The service borrows its collaborators, so the embedding client is built once near process
/// start and reused for every call within the run.
pub struct ExtractionService<'a> {
    embedding_client: &'a dyn EmbeddingClient,
    page_source: &'a dyn PageTextSource,
    outline_store: &'a dyn OutlineStore,
    classifier: &'a dyn HeadingClassifier,
    metrics: RunMetrics,
}

impl<'a> ExtractionService<'a> {
    /// Build a service from its collaborators.
    pub fn new(
        embedding_client: &'a dyn EmbeddingClient,
        page_source: &'a dyn PageTextSource,
        outline_store: &'a dyn OutlineStore,
        classifier: &'a dyn HeadingClassifier,
    ) -> Self {
        Self {
            embedding_client,
            page_source,
            outline_store,
            classifier,
            metrics: RunMetrics::new(),
        }
    }

    /// Run the pipeline and return the report without writing it.
    ///
    /// Segmentation counters are reset first, so [`Self::metrics_snapshot`] describes the latest
    /// run only.
    pub async fn run(&self, request: &RunRequest) -> Result<Report, PipelineError> {
        let input_dir = request.input_dir.as_path();
        if !input_dir.is_dir() {
            return Err(PipelineError::InputUnavailable {
                path: input_dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }
        self.metrics.reset();

        let persona = read_prompt(input_dir, PERSONA_FILE, DEFAULT_PERSONA);
        let task = read_prompt(input_dir, TASK_FILE, DEFAULT_TASK);
        let documents = self.list_documents(input_dir)?;
        tracing::info!(
            input = %input_dir.display(),
            documents = documents.len(),
            persona = %persona,
            task = %task,
            "Starting extraction run"
        );

        let mut pool: Vec<Section> = Vec::new();
        for name in &documents {
            pool.extend(self.segment_document(input_dir, name)?);
        }

        let snapshot = self.metrics_snapshot();
        tracing::info!(
            documents = snapshot.documents_processed,
            outline_documents = snapshot.outline_documents,
            heuristic_documents = snapshot.heuristic_documents,
            empty_documents = snapshot.empty_documents,
            sections = snapshot.sections_emitted,
            "Segmentation finished"
        );

        if pool.is_empty() {
            return Err(PipelineError::NoSections);
        }

        let ranker = RelevanceRanker::new(self.embedding_client);
        let ranked = ranker.rank(pool, &persona, &task, request.top_k).await?;
        tracing::info!(kept = ranked.len(), top_k = request.top_k, "Ranking finished");

        Ok(report::assemble(&ranked, &documents, &persona, &task))
    }

    /// Run the pipeline and write the report to `output_dir/file_name`.
    ///
    /// Nothing is written, and `output_dir` is not created, when the run aborts.
    pub async fn run_to_file(
        &self,
        request: &RunRequest,
        output_dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, PipelineError> {
        let report = self.run(request).await?;
        report::write_report(&report, output_dir, file_name)
    }

    /// Segment one document from the input directory.
    pub fn segment_document(
        &self,
        input_dir: &Path,
        name: &str,
    ) -> Result<Vec<Section>, PipelineError> {
        let headings = outline::resolve(self.outline_store, name);
        let pages = self.page_source.open(&input_dir.join(name))?;
        let segmenter = SectionSegmenter::new(self.classifier);
        let (strategy, sections) = segmenter.segment(name, pages.as_ref(), headings.as_deref());

        self.metrics.record_document(strategy, sections.len() as u64);
        if sections.is_empty() {
            tracing::warn!(document = name, ?strategy, "Document produced no sections");
        } else {
            tracing::debug!(
                document = name,
                ?strategy,
                pages = pages.page_count(),
                sections = sections.len(),
                "Document segmented"
            );
        }
        Ok(sections)
    }

    /// File names of the documents in `input_dir`, sorted for a stable pool order.
    pub fn list_documents(&self, input_dir: &Path) -> Result<Vec<String>, PipelineError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|error| PipelineError::InputUnavailable {
                path: input_dir.to_path_buf(),
                message: error.to_string(),
            })?;
            if !entry.file_type().is_file() || !self.page_source.accepts(entry.path()) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            } else {
                tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            }
        }
        names.sort();
        Ok(names)
    }

    /// Return the segmentation counters for this run.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Read a trimmed prompt file, falling back to `default` when missing or blank.
fn read_prompt(input_dir: &Path, file_name: &str, default: &str) -> String {
    let path = input_dir.join(file_name);
    match std::fs::read_to_string(&path) {
        Ok(contents) if !contents.trim().is_empty() => contents.trim().to_string(),
        Ok(_) => {
            tracing::debug!(path = %path.display(), "Prompt file blank; using default");
            default.to_string()
        }
        Err(error) => {
            tracing::debug!(path = %path.display(), %error, "Prompt file unavailable; using default");
            default.to_string()
        }
    }
}
