use super::{Context, Format};
use crate::render;
use anyhow::{Context as _, Result, bail};
use clap::Args;
use devmirror_core::{Profiler, ScoredAnalysis, SessionReport};
use devmirror_shared::{AnalysisError, PeerSignal};
use futures::future::try_join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[arg(required = true, help = "Rust source files to analyze")]
    pub files: Vec<PathBuf>,

    #[arg(long, help = "Record each valid snapshot in this subject's history")]
    pub subject: Option<String>,

    #[arg(long, help = "JSON file holding the peer analysis signal")]
    pub peer: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

struct FileAnalysis {
    path: PathBuf,
    source: String,
    result: std::result::Result<ScoredAnalysis, AnalysisError>,
}

#[derive(Debug, Serialize)]
struct FileOutcome {
    file: String,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome {
    Analyzed(ScoredAnalysis),
    Recorded(SessionReport),
    Invalid {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
}

impl From<AnalysisError> for Outcome {
    fn from(error: AnalysisError) -> Self {
        let AnalysisError::InvalidCode {
            message,
            line,
            column,
        } = error;
        Outcome::Invalid {
            message,
            line,
            column,
        }
    }
}

pub async fn run(ctx: &Context, args: AnalyzeArgs) -> Result<()> {
    let profiler = Arc::new(Profiler::new(&ctx.config));
    let peer = match &args.peer {
        Some(path) => Some(load_peer(path).await?),
        None => None,
    };

    let analyses = analyze_files(Arc::clone(&profiler), &args.files).await?;
    info!(files = analyses.len(), "Snapshots analyzed");

    let mut store = match &args.subject {
        Some(_) => Some(ctx.open_store()?),
        None => None,
    };

    let mut outcomes = Vec::with_capacity(analyses.len());
    for FileAnalysis { path, source, result } in analyses {
        let outcome = match (result, &args.subject, store.as_mut()) {
            (Err(error), _, _) => Outcome::from(error),
            (Ok(analysis), Some(subject), Some(store)) => {
                let report = profiler.record(store, subject, &source, analysis, peer.clone())?;
                Outcome::Recorded(report)
            }
            (Ok(analysis), _, _) => Outcome::Analyzed(analysis),
        };
        outcomes.push(FileOutcome {
            file: path.display().to_string(),
            outcome,
        });
    }

    print_outcomes(&outcomes, args.format)?;

    let invalid = outcomes
        .iter()
        .filter(|o| matches!(o.outcome, Outcome::Invalid { .. }))
        .count();
    if invalid > 0 {
        bail!("{invalid} of {} snapshot(s) could not be parsed", outcomes.len());
    }
    Ok(())
}

/// Read and analyze every file concurrently, keeping argument order
async fn analyze_files(profiler: Arc<Profiler>, files: &[PathBuf]) -> Result<Vec<FileAnalysis>> {
    let tasks = files.iter().cloned().map(|path| {
        let profiler = Arc::clone(&profiler);
        async move {
            let source = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;

            let (source, result) = tokio::task::spawn_blocking(move || {
                let result = profiler.analyze(&source);
                (source, result)
            })
            .await?;

            debug!(path = %path.display(), valid = result.is_ok(), "Snapshot analyzed");
            Ok::<_, anyhow::Error>(FileAnalysis {
                path,
                source,
                result,
            })
        }
    });

    try_join_all(tasks).await
}

async fn load_peer(path: &Path) -> Result<PeerSignal> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read peer signal {}", path.display()))?;
    let signal: PeerSignal = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid peer signal in {}", path.display()))?;

    Ok(PeerSignal::new(
        signal.thinking_style,
        signal.confidence,
        signal.debug_loop,
    ))
}

fn print_outcomes(outcomes: &[FileOutcome], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(outcomes)?),
        Format::Text => {
            for (index, FileOutcome { file, outcome }) in outcomes.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                match outcome {
                    Outcome::Analyzed(analysis) => print!("{}", render::analysis(file, analysis)),
                    Outcome::Recorded(report) => print!("{}", render::session(file, report)),
                    Outcome::Invalid {
                        message,
                        line,
                        column,
                    } => {
                        let error = AnalysisError::InvalidCode {
                            message: message.clone(),
                            line: *line,
                            column: *column,
                        };
                        eprint!("{}", render::invalid(file, &error));
                    }
                }
            }
        }
    }
    Ok(())
}
