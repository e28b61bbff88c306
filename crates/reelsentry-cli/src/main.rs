//! ReelSentry CLI
//!
//! Headless front end for the moderation pipeline: point it at a video, get
//! the ordered report on stdout. Oracle backends are HTTP services by
//! default; `--stub` swaps in the deterministic stubs for offline smoke runs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use reelsentry_core::{
    HttpClassifier, HttpTranscriber, ModerationConfig, ModerationPipeline, ObjectClassifier,
    ReportStatus, StubClassifier, StubTranscriber, Transcriber,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Multi-modal moderation pre-filter for uploaded video
#[derive(Parser, Debug)]
#[command(name = "reelsentry", version, about)]
struct Cli {
    /// Video file to analyze
    video: PathBuf,

    /// Path to a JSON configuration file (built-in policy when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Speech-recognition service endpoint
    #[arg(long, env = "REELSENTRY_TRANSCRIBER_URL")]
    transcriber_url: Option<String>,

    /// Object-detection service endpoint
    #[arg(long, env = "REELSENTRY_CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Use deterministic stub oracles instead of HTTP services
    #[arg(long)]
    stub: bool,

    /// Emit the report as JSON instead of plain lines
    #[arg(long)]
    json: bool,
}

fn build_oracles(cli: &Cli) -> Result<(Arc<dyn Transcriber>, Arc<dyn ObjectClassifier>)> {
    if cli.stub {
        return Ok((
            Arc::new(StubTranscriber::text("")),
            Arc::new(StubClassifier::empty()),
        ));
    }

    let transcriber_url = cli
        .transcriber_url
        .as_deref()
        .context("A transcriber endpoint is required (--transcriber-url or --stub)")?;
    let classifier_url = cli
        .classifier_url
        .as_deref()
        .context("A classifier endpoint is required (--classifier-url or --stub)")?;

    let transcriber = HttpTranscriber::new(transcriber_url)
        .context("Failed to create transcription client")?;
    let classifier =
        HttpClassifier::new(classifier_url).context("Failed to create classification client")?;

    Ok((Arc::new(transcriber), Arc::new(classifier)))
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => ModerationConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ModerationConfig::default(),
    };

    let (transcriber, classifier) = build_oracles(&cli)?;
    let pipeline = ModerationPipeline::new(config, transcriber, classifier);

    info!(video = %cli.video.display(), "Analyzing");
    let report = pipeline.analyze(&cli.video).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render());
    }

    // analysis errors are report content; they still fail the invocation
    Ok(match report.status {
        ReportStatus::Clean | ReportStatus::Flagged => ExitCode::SUCCESS,
        ReportStatus::Error => ExitCode::FAILURE,
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
