use anyhow::{Context, Result};
use clap::Parser;
use section_rank::{
    config::{self, EmbeddingProvider},
    embedding, logging,
    processing::{
        ExtractionService, RunRequest,
        heading::PatternHeadingClassifier,
        outline::{DirectoryOutlineStore, NoOutlines, OutlineStore},
    },
    source::PdfPageSource,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "section-rank",
    about = "Extract document sections and rank them for a persona and task"
)]
struct Cli {
    /// Directory holding the PDFs plus optional persona.txt and job.txt.
    input_dir: PathBuf,
    /// Directory of precomputed outline JSON files.
    #[arg(long)]
    outlines: Option<PathBuf>,
    /// Directory the report is written to.
    #[arg(long, default_value = "output")]
    output: PathBuf,
    /// Report file name inside the output directory.
    #[arg(long, default_value = "ranked_sections.json")]
    output_name: String,
    /// Number of ranked sections to keep (overrides SECTION_RANK_TOP_K).
    #[arg(long)]
    top_k: Option<usize>,
    /// Embedding provider (overrides EMBEDDING_PROVIDER).
    #[arg(long, value_enum)]
    provider: Option<EmbeddingProvider>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    config::load_env_file();
    logging::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(path) => {
            println!("wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "Run aborted");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<PathBuf> {
    let mut config = config::init_config()
        .context("failed to load configuration")?
        .clone();
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
    if let Some(provider) = cli.provider {
        config.embedding_provider = provider;
    }
    config.validate().context("invalid configuration")?;

    let client = embedding::connect_embedding_client(&config)
        .await
        .context("embedding model unavailable")?;

    let outline_store: Box<dyn OutlineStore> = match cli.outlines {
        Some(dir) => Box::new(DirectoryOutlineStore::new(dir)),
        None => Box::new(NoOutlines),
    };
    let page_source = PdfPageSource;
    let classifier = PatternHeadingClassifier::new();
    let service = ExtractionService::new(
        client.as_ref(),
        &page_source,
        outline_store.as_ref(),
        &classifier,
    );

    let request = RunRequest {
        input_dir: cli.input_dir,
        top_k: config.top_k,
    };
    let path = service
        .run_to_file(&request, &cli.output, &cli.output_name)
        .await?;
    Ok(path)
}
