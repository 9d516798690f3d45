//! Uplift CLI — batch file uploads against the Uplift file API.
//!
//! Set UPLIFT_TOKEN (or UPLIFT_API_KEY) and UPLIFT_API_URL (or API_URL).

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Serialize;

use uplift_cli::{init_tracing, read_selection_item};
use uplift_client::{ApiClient, HttpTransport};
use uplift_core::{BatchOutcome, BatchUploadCoordinator, ProgressSink, UploadMetadata};

#[derive(Parser)]
#[command(name = "uplift", about = "Uplift file API CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one or more files as a single batch
    Upload {
        /// Paths of the files to upload
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
        /// Comma-separated tags applied to every file in the batch
        #[arg(long)]
        tags: Option<String>,
        /// Mark the uploaded files as publicly accessible
        #[arg(long)]
        public: bool,
    },
    /// List stored file records
    List,
}

/// Progress sink printing to stderr, one line per attempted item plus a
/// final summary naming the files that failed.
struct ConsoleSink;

#[async_trait]
impl ProgressSink for ConsoleSink {
    async fn on_progress(&self, completed: usize, total: usize, percent: u32) {
        eprintln!("{}% ({}/{})", percent, completed, total);
    }

    async fn on_complete(&self, outcome: &BatchOutcome) {
        if outcome.cancelled {
            eprintln!(
                "Cancelled after {} uploaded, {} failed",
                outcome.success_count, outcome.fail_count
            );
            return;
        }
        if outcome.fail_count == 0 {
            eprintln!("Uploaded {} file(s)", outcome.success_count);
        } else {
            eprintln!(
                "Uploaded {} file(s), {} failed:",
                outcome.success_count, outcome.fail_count
            );
            for failure in &outcome.failures {
                eprintln!("  {}: {}", failure.item.name, failure.error);
            }
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let client = ApiClient::from_env()
        .context("Failed to create API client. Set UPLIFT_TOKEN and UPLIFT_API_URL (or API_URL)")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            files,
            tags,
            public,
        } => {
            let transport = Arc::new(HttpTransport::new(client));
            let mut batch = BatchUploadCoordinator::new(transport, Arc::new(ConsoleSink));
            for path in &files {
                batch.add_item(read_selection_item(path).await?)?;
            }

            let metadata = UploadMetadata {
                tags,
                is_public: public,
            };
            let outcome = batch.start(metadata).await?;

            if outcome.success_count == 0 {
                anyhow::bail!("all {} upload(s) failed", outcome.fail_count);
            }
        }
        Commands::List => {
            let files = client.list_files().await?;
            print_json(&files)?;
        }
    }

    Ok(())
}
