mod commands;
mod render;
mod store;

use anyhow::Context as _;
use clap::{ArgAction, Parser};
use commands::{Commands, Context};
use devmirror_shared::{DevMirrorConfig, LogFormat, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devmirror", version)]
#[command(about = "DevMirror.rs - structural coding profiles from Rust snapshots")]
struct Cli {
    #[arg(long, global = true, help = "Configuration file to load")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory holding subject histories")]
    history_dir: Option<PathBuf>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = DevMirrorConfig::discover(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_logging(&config.logging, cli.verbose);

    let history_dir = cli
        .history_dir
        .unwrap_or_else(|| config.storage.resolve_history_dir());
    let ctx = Context {
        config,
        history_dir,
    };

    commands::run(cli.command, &ctx).await
}

/// `RUST_LOG` wins, then `-v` flags, then the configured level
fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let directive = match verbose {
        0 => logging.level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
