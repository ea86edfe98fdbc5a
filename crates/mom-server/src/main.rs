//! mom-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! record store, and serves the minutes API under `/api`.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use mom_api::AppState;
use mom_core::{state::MemoryStateStore, store::RecordStore};
use mom_openai::OpenAiClient;
use mom_server::{expand_tilde, load_config};
use mom_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Meeting minutes assistant server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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
  let server_cfg = load_config(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if store.list_consultants().await?.is_empty() {
    let seeded = store.add_consultant(server_cfg.default_consultant.clone()).await?;
    tracing::info!(id = seeded.id, name = %seeded.name, "seeded default consultant");
  }

  let completion = OpenAiClient::new(server_cfg.openai.clone())
    .context("failed to configure completion client")?;

  let state = AppState::new(
    Arc::new(store),
    Arc::new(completion),
    Arc::new(MemoryStateStore::new()),
    server_cfg.conversation.clone(),
    server_cfg.minutes.clone(),
  );

  let app = axum::Router::new().nest("/api", mom_api::api_router(state));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
