//! outcomes server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and either serves the JSON API or processes a single file from disk.
//!
//! ```text
//! outcomes serve
//! outcomes ingest week1.csv
//! outcomes validate week1.csv
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::extract::DefaultBodyLimit;
use chrono::Utc;
use clap::{Parser, Subcommand};
use outcomes_api::{ApiState, ingest_upload};
use outcomes_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Patient outcomes CSV ingestion service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Validate a CSV file and ingest it as one batch.
  Ingest {
    file: PathBuf,
  },
  /// Validate a CSV file without touching the store.
  Validate {
    file: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  match cli.command {
    Command::Serve => serve(cfg).await,
    Command::Ingest { file } => ingest(cfg, file).await,
    Command::Validate { file } => {
      let verdict = outcomes_csv::validate_path(&file, &cfg.encodings);
      if !verdict.is_valid {
        anyhow::bail!("{}: {}", file.display(), verdict.message);
      }
      println!("{}: {}", file.display(), verdict.message);
      Ok(())
    }
  }
}

async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = cfg.resolved_store_path();
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = open_store(&cfg).await?;
  let state = ApiState::new(Arc::new(store), cfg.encodings.clone());

  let app = outcomes_api::api_router(state)
    .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
    .layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn ingest(cfg: ServerConfig, file: PathBuf) -> anyhow::Result<()> {
  let bytes = tokio::fs::read(&file)
    .await
    .with_context(|| format!("failed to read {}", file.display()))?;
  let filename = file
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();

  let store = open_store(&cfg).await?;
  let summary =
    ingest_upload(&store, &cfg.encodings, &filename, &bytes, Utc::now()).await?;

  println!(
    "{}: {} ({} records, {} new patients)",
    file.display(),
    outcomes_api::uploads::SUCCESS_MESSAGE,
    summary.records,
    summary.new_patients,
  );
  Ok(())
}
