use std::collections::HashMap;
use std::path::Path;

use section_rank::{
    embedding::HashedEmbeddingClient,
    processing::{
        DEFAULT_PERSONA, DEFAULT_TASK, ExtractionService, PipelineError, RunRequest, SourceError,
        heading::PatternHeadingClassifier,
        outline::{DirectoryOutlineStore, NoOutlines},
        report,
    },
    source::{DocumentPages, PageTextSource, PagedText},
};

/// Page source serving canned page text for `.pdf` names found on disk.
struct CannedPages(HashMap<String, Vec<String>>);

impl CannedPages {
    fn new(documents: &[(&str, &[&str])]) -> Self {
        Self(
            documents
                .iter()
                .map(|(name, pages)| {
                    (
                        name.to_string(),
                        pages.iter().map(|page| page.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}

impl PageTextSource for CannedPages {
    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|extension| extension == "pdf")
    }

    fn open(&self, path: &Path) -> Result<Box<dyn DocumentPages>, SourceError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let pages = self.0.get(name).cloned().ok_or_else(|| SourceError::Parse {
            path: path.to_path_buf(),
            message: "no canned pages".into(),
        })?;
        Ok(Box::new(PagedText::new(pages)))
    }
}

fn input_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in names {
        std::fs::write(dir.path().join(name), b"%PDF-placeholder").expect("write document");
    }
    dir
}

#[tokio::test]
async fn outline_document_splits_on_heading_pages() {
    let dir = input_dir(&["paper.pdf"]);
    let outlines = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        outlines.path().join("paper.json"),
        r#"{"title":"Paper","outline":[{"level":"H1","text":"Methods","page":3},{"level":"H1","text":"Intro","page":1}]}"#,
    )
    .expect("write outline");

    let pages = CannedPages::new(&[("paper.pdf", &["p1", "p2", "p3", "p4", "p5"])]);
    let store = DirectoryOutlineStore::new(outlines.path());
    let client = HashedEmbeddingClient::new(64);
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(&client, &pages, &store, &classifier);

    let sections = service
        .segment_document(dir.path(), "paper.pdf")
        .expect("segmented");

    assert_eq!(sections.len(), 2);
    assert_eq!(
        (sections[0].title.as_str(), sections[0].start_page),
        ("Intro", 1)
    );
    assert_eq!(sections[0].text, "p1 p2");
    assert_eq!(
        (sections[1].title.as_str(), sections[1].start_page),
        ("Methods", 3)
    );
    assert_eq!(sections[1].text, "p3 p4 p5");
}

#[tokio::test]
async fn heuristic_document_starts_at_first_heading() {
    let dir = input_dir(&["notes.pdf"]);
    let pages = CannedPages::new(&[(
        "notes.pdf",
        &["preface that is dropped\n1. Overview\nbody of the overview"],
    )]);
    let client = HashedEmbeddingClient::new(64);
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(&client, &pages, &NoOutlines, &classifier);

    let sections = service
        .segment_document(dir.path(), "notes.pdf")
        .expect("segmented");

    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].title, "1. Overview");
    assert_eq!(sections[0].start_page, 1);
    assert_eq!(sections[0].text, "body of the overview");
}

#[tokio::test]
async fn report_splits_ranks_and_lists_every_document() {
    let dir = input_dir(&["a.pdf", "b.pdf", "blank.pdf", "ignored.docx"]);
    std::fs::write(dir.path().join("persona.txt"), "Travel Planner\n").expect("persona");
    std::fs::write(dir.path().join("job.txt"), " Plan a 4-day trip ").expect("job");

    let pages = CannedPages::new(&[
        (
            "a.pdf",
            &[
                "Cities\nnice town squares\nRestaurants\nlocal seafood",
                "Hotels\nbudget rooms\nNightlife\nbars and clubs",
            ],
        ),
        (
            "b.pdf",
            &["Packing\nbring layers\nHistory\nold castles\nBeaches\nsand and sun"],
        ),
        ("blank.pdf", &["", "   "]),
    ]);
    let client = HashedEmbeddingClient::new(128);
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(&client, &pages, &NoOutlines, &classifier);

    let report = service
        .run(&RunRequest {
            input_dir: dir.path().to_path_buf(),
            top_k: 10,
        })
        .await
        .expect("report");

    assert_eq!(
        report.metadata.input_documents,
        vec!["a.pdf", "b.pdf", "blank.pdf"]
    );
    assert_eq!(report.metadata.persona, "Travel Planner");
    assert_eq!(report.metadata.job_to_be_done, "Plan a 4-day trip");

    let ranks: Vec<_> = report
        .extracted_sections
        .iter()
        .map(|entry| entry.importance_rank)
        .collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    assert_eq!(report.subsection_analysis.len(), 2);
    assert!(
        report
            .subsection_analysis
            .iter()
            .all(|entry| entry.refined_text.chars().count() <= report::REFINED_TEXT_CHARS)
    );

    let snapshot = service.metrics_snapshot();
    assert_eq!(snapshot.documents_processed, 3);
    assert_eq!(snapshot.empty_documents, 1);
    assert_eq!(snapshot.sections_emitted, 7);
}

#[tokio::test]
async fn run_is_deterministic() {
    let dir = input_dir(&["a.pdf"]);
    let pages = CannedPages::new(&[("a.pdf", &["Alpha\none\nBeta\none\nGamma\ntwo"])]);
    let client = HashedEmbeddingClient::new(32);
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(&client, &pages, &NoOutlines, &classifier);
    let request = RunRequest {
        input_dir: dir.path().to_path_buf(),
        top_k: 10,
    };

    let first = service.run(&request).await.expect("first");
    let second = service.run(&request).await.expect("second");
    let snapshot = service.metrics_snapshot();
    assert_eq!(snapshot.documents_processed, 1);
    assert_eq!(snapshot.sections_emitted, 3);

    assert_eq!(first.extracted_sections, second.extracted_sections);
    assert_eq!(first.metadata.persona, DEFAULT_PERSONA);
    assert_eq!(first.metadata.job_to_be_done, DEFAULT_TASK);

    // "Alpha" and "Beta" carry identical text, so they tie and keep pool order.
    let titles: Vec<_> = first
        .extracted_sections
        .iter()
        .map(|entry| entry.section_title.as_str())
        .collect();
    let alpha = titles.iter().position(|title| *title == "Alpha");
    let beta = titles.iter().position(|title| *title == "Beta");
    assert!(alpha < beta);
}

#[tokio::test]
async fn empty_pool_aborts_without_report() {
    let dir = input_dir(&["blank.pdf"]);
    let output = tempfile::tempdir().expect("tempdir");
    let report_dir = output.path().join("reports");
    let pages = CannedPages::new(&[("blank.pdf", &["lowercase only"])]);
    let client = HashedEmbeddingClient::new(32);
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(&client, &pages, &NoOutlines, &classifier);

    let error = service
        .run_to_file(
            &RunRequest {
                input_dir: dir.path().to_path_buf(),
                top_k: 10,
            },
            &report_dir,
            "ranked_sections.json",
        )
        .await
        .expect_err("no sections");

    assert!(matches!(error, PipelineError::NoSections));
    assert!(!report_dir.exists());
}

#[tokio::test]
async fn successful_run_writes_report_file() {
    let dir = input_dir(&["a.pdf"]);
    let output = tempfile::tempdir().expect("tempdir");
    let report_dir = output.path().join("reports");
    let pages = CannedPages::new(&[("a.pdf", &["Alpha\nfirst\nBeta\nsecond"])]);
    let client = HashedEmbeddingClient::new(32);
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(&client, &pages, &NoOutlines, &classifier);

    let path = service
        .run_to_file(
            &RunRequest {
                input_dir: dir.path().to_path_buf(),
                top_k: 10,
            },
            &report_dir,
            "ranked_sections.json",
        )
        .await
        .expect("written");

    assert_eq!(path, report_dir.join("ranked_sections.json"));
    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).expect("read report")).expect("parse");
    assert_eq!(value["extracted_sections"].as_array().map(Vec::len), Some(2));
    let entries: Vec<_> = std::fs::read_dir(&report_dir)
        .expect("list")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(entries, vec!["ranked_sections.json"]);
}

#[tokio::test]
async fn missing_input_directory_aborts() {
    let pages = CannedPages::new(&[]);
    let client = HashedEmbeddingClient::new(32);
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(&client, &pages, &NoOutlines, &classifier);

    let error = service
        .run(&RunRequest {
            input_dir: "/nonexistent/section-rank-input".into(),
            top_k: 10,
        })
        .await
        .expect_err("missing input");

    assert!(matches!(error, PipelineError::InputUnavailable { .. }));
}

#[tokio::test]
async fn unreadable_document_aborts() {
    let dir = input_dir(&["ghost.pdf"]);
    let pages = CannedPages::new(&[]);
    let client = HashedEmbeddingClient::new(32);
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(&client, &pages, &NoOutlines, &classifier);

    let error = service
        .run(&RunRequest {
            input_dir: dir.path().to_path_buf(),
            top_k: 10,
        })
        .await
        .expect_err("unreadable");

    assert!(matches!(error, PipelineError::Source(_)));
}
