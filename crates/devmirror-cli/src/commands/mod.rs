mod analyze;

use crate::render;
use crate::store::JsonHistoryStore;
use anyhow::{Context as _, Result, bail};
use clap::{Subcommand, ValueEnum};
use devmirror_core::{HistoryStore, Profiler, TrendSummary};
use devmirror_shared::{DevMirrorConfig, LOCAL_CONFIG_FILE};
use serde::Serialize;
use std::path::PathBuf;

pub use analyze::AnalyzeArgs;

/// Settings resolved once at startup
#[derive(Debug, Clone)]
pub struct Context {
    pub config: DevMirrorConfig,
    pub history_dir: PathBuf,
}

impl Context {
    fn open_store(&self) -> Result<JsonHistoryStore> {
        JsonHistoryStore::open(&self.history_dir).with_context(|| {
            format!("Failed to open history store at {}", self.history_dir.display())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze Rust snapshots, optionally recording them for a subject
    Analyze(AnalyzeArgs),

    /// Show longitudinal trends for a subject
    Trend {
        #[arg(long, help = "Subject whose history to evaluate")]
        subject: String,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// List the stored history of a subject
    History {
        #[arg(long, help = "Subject whose history to list")]
        subject: String,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to a file
    Init {
        #[arg(help = "Target file (defaults to the per-user config location)")]
        path: Option<PathBuf>,
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
}

pub async fn run(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Analyze(args) => analyze::run(ctx, args).await,
        Commands::Trend { subject, format } => show_trend(ctx, &subject, format),
        Commands::History { subject, format } => show_history(ctx, &subject, format),
        Commands::Config(cmd) => handle_config_command(cmd, ctx),
    }
}

#[derive(Debug, Serialize)]
struct TrendView<'a> {
    subject: &'a str,
    latest_score: Option<f64>,
    mean_score_delta: Option<f64>,
    #[serde(flatten)]
    summary: TrendSummary,
}

fn show_trend(ctx: &Context, subject: &str, format: Format) -> Result<()> {
    let history = ctx.open_store()?.load(subject)?;
    let profiler = Profiler::new(&ctx.config);

    let view = TrendView {
        subject,
        latest_score: history.latest().map(|entry| entry.score.value()),
        mean_score_delta: profiler.trend_engine().mean_score_delta(&history),
        summary: profiler.evaluate(&history),
    };

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        Format::Text => {
            println!("📈 {subject}");
            if let Some(score) = view.latest_score {
                println!("  Latest score:           {score:.2}");
            }
            if let Some(delta) = view.mean_score_delta {
                println!("  Mean score delta:       {delta:+.2}");
            }
            print!("{}", render::trends(&view.summary));
        }
    }
    Ok(())
}

fn show_history(ctx: &Context, subject: &str, format: Format) -> Result<()> {
    let history = ctx.open_store()?.load(subject)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&history)?),
        Format::Text => print!("{}", render::history(subject, &history)),
    }
    Ok(())
}

fn handle_config_command(cmd: ConfigCommands, ctx: &Context) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("# history_dir = {}", ctx.history_dir.display());
            print!("{}", ctx.config.to_toml()?);
        }
        ConfigCommands::Init { path, force } => {
            let path = path
                .or_else(DevMirrorConfig::default_config_path)
                .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));

            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }

            DevMirrorConfig::default().save_to_file(&path)?;
            println!("✅ Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
