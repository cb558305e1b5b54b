//! Report assembly and persistence.

use super::types::{PipelineError, RankedSection};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

/// Number of top-ranked sections listed in `extracted_sections`.
pub const HEADLINE_COUNT: usize = 5;
/// Character cap applied to `refined_text`.
pub const REFINED_TEXT_CHARS: usize = 500;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Final output of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Run metadata.
    pub metadata: ReportMetadata,
    /// Top-ranked sections, titles only.
    pub extracted_sections: Vec<ExtractedSection>,
    /// Remaining ranked sections with truncated text.
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// Run metadata carried in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMetadata {
    /// Every input document, including ones that produced no sections.
    pub input_documents: Vec<String>,
    /// Persona text, verbatim.
    pub persona: String,
    /// Task text, verbatim.
    pub job_to_be_done: String,
    /// Generation time, `YYYY-MM-DDTHH:MM:SS`.
    pub processing_timestamp: String,
}

/// Headline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedSection {
    /// Source document file name.
    pub document: String,
    /// Section title.
    pub section_title: String,
    /// 1-based rank.
    pub importance_rank: usize,
    /// Page the section starts on.
    pub page_number: usize,
}

/// Detail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsectionAnalysis {
    /// Source document file name.
    pub document: String,
    /// Section text cut to [`REFINED_TEXT_CHARS`] characters.
    pub refined_text: String,
    /// Page the section starts on.
    pub page_number: usize,
}

/// Cut `text` to at most `limit` characters, without any marker.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Format a timestamp the way reports carry it.
pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "1970-01-01T00:00:00".to_string())
}

/// Build a report stamped with the current UTC time.
pub fn assemble(
    ranked: &[RankedSection],
    documents: &[String],
    persona: &str,
    task: &str,
) -> Report {
    assemble_at(ranked, documents, persona, task, OffsetDateTime::now_utc())
}

/// Build a report stamped with `timestamp`.
///
/// `ranked` must be in rank order; the first [`HEADLINE_COUNT`] entries become headlines and the
/// rest become detail entries.
pub fn assemble_at(
    ranked: &[RankedSection],
    documents: &[String],
    persona: &str,
    task: &str,
    timestamp: OffsetDateTime,
) -> Report {
    let split = ranked.len().min(HEADLINE_COUNT);
    let (headline, detail) = ranked.split_at(split);

    Report {
        metadata: ReportMetadata {
            input_documents: documents.to_vec(),
            persona: persona.to_string(),
            job_to_be_done: task.to_string(),
            processing_timestamp: format_timestamp(timestamp),
        },
        extracted_sections: headline
            .iter()
            .map(|entry| ExtractedSection {
                document: entry.section.document.clone(),
                section_title: entry.section.title.clone(),
                importance_rank: entry.rank,
                page_number: entry.section.start_page,
            })
            .collect(),
        subsection_analysis: detail
            .iter()
            .map(|entry| SubsectionAnalysis {
                document: entry.section.document.clone(),
                refined_text: truncate_chars(&entry.section.text, REFINED_TEXT_CHARS),
                page_number: entry.section.start_page,
            })
            .collect(),
    }
}

/// Serialise `report` as 4-space indented JSON.
pub fn to_json(report: &Report) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    report.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Write `report` to `<output_dir>/<file_name>`, creating the directory if needed.
///
/// The file is written under a temporary name and renamed into place, so readers never observe a
/// partial report.
pub fn write_report(
    report: &Report,
    output_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, PipelineError> {
    let destination = output_dir.join(file_name);
    let output_error = |source| PipelineError::Output {
        path: destination.clone(),
        source,
    };

    let json = to_json(report)?;
    std::fs::create_dir_all(output_dir).map_err(output_error)?;

    let staging = output_dir.join(format!(".{file_name}.tmp"));
    let result = std::fs::File::create(&staging)
        .and_then(|mut file| {
            file.write_all(&json)?;
            file.write_all(b"\n")?;
            file.sync_all()
        })
        .and_then(|()| std::fs::rename(&staging, &destination));

    if let Err(source) = result {
        let _ = std::fs::remove_file(&staging);
        return Err(output_error(source));
    }

    tracing::info!(path = %destination.display(), "Report written");
    Ok(destination)
}
