//! `resumecraft` -- command-line client for the ResumeCraft API.
//!
//! - `resumecraft generate` -- Turn a career description into a structured
//!   resume, optionally saving PDF and DOCX renders.
//! - `resumecraft health` -- Print the server's health document.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod client;
mod retry;

use client::{DownloadFormat, ResumeClient};
use retry::RetryPolicy;

const DEFAULT_SERVER: &str = "http://localhost:5000";

/// ResumeCraft command-line client.
#[derive(Parser)]
#[command(name = "resumecraft", about = "ResumeCraft command-line client", version)]
struct Cli {
    /// Base URL of the ResumeCraft server.
    #[arg(long, global = true, env = "RESUMECRAFT_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a structured resume from free-form career text.
    Generate(GenerateArgs),

    /// Show server health.
    Health,
}

#[derive(Args)]
struct GenerateArgs {
    /// File holding the career description (stdin when omitted).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the resume JSON here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also save a PDF render to this path.
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Also save a DOCX render to this path.
    #[arg(long)]
    docx: Option<PathBuf>,

    /// Total attempts for the generation request.
    #[arg(long, default_value_t = 3)]
    attempts: u32,

    /// Fixed pause between attempts, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let client = ResumeClient::new(&cli.server)?;

    match cli.command {
        Commands::Generate(args) => generate(&client, args).await,
        Commands::Health => {
            let health = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Filter directive for this binary's own targets.
fn default_log_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
}

async fn generate(client: &ResumeClient, args: GenerateArgs) -> Result<()> {
    let prompt = read_prompt(args.input.as_deref()).await?;
    let policy = RetryPolicy {
        max_attempts: args.attempts,
        delay: Duration::from_millis(args.delay_ms),
    };

    let generated = client.generate(&prompt, &policy).await?;
    if let Some(time) = &generated.processing_time {
        info!("server processed the request in {time}");
    }

    let pretty = serde_json::to_string_pretty(&generated.data)?;
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, pretty)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("resume saved to {}", path.display());
        }
        None => println!("{pretty}"),
    }

    if let Some(path) = &args.pdf {
        save_render(client, &generated.data, DownloadFormat::Pdf, path).await?;
    }
    if let Some(path) = &args.docx {
        save_render(client, &generated.data, DownloadFormat::Docx, path).await?;
    }
    Ok(())
}

async fn read_prompt(input: Option<&Path>) -> Result<String> {
    let prompt = match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read prompt from stdin")?;
            buf
        }
    };
    Ok(prompt)
}

async fn save_render(
    client: &ResumeClient,
    record: &serde_json::Value,
    format: DownloadFormat,
    path: &Path,
) -> Result<()> {
    let bytes = client.download(record, format).await?;
    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(size_bytes = bytes.len(), "saved {}", path.display());
    Ok(())
}
