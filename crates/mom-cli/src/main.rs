//! `mom`: chat with the minutes assistant from a terminal.
//!
//! # Usage
//!
//! ```text
//! mom --url http://localhost:8000 --consultant 1
//! mom --config ~/.config/mom/config.toml --output acme_minutes.txt
//! ```
//!
//! Type answers at the prompt. `/generate` writes up the session, `/new`
//! starts over, `/quit` (or `exit`) leaves.

mod app;
mod client;

use std::{io::Write as _, path::PathBuf};

use anyhow::{Context, Result};
use app::{App, Command};
use clap::Parser;
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "mom", about = "Interview-driven meeting minutes")]
struct Args {
  /// Path to a TOML config file (url, consultant_id, output).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the minutes server (default: http://localhost:8000).
  #[arg(long, env = "MOM_URL")]
  url: Option<String>,

  /// Consultant id to run the interview as (default: 1).
  #[arg(long)]
  consultant: Option<i64>,

  /// Where to write generated minutes (default: Meeting_Minutes.txt).
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  url:           Option<String>,
  consultant_id: Option<i64>,
  output:        Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url:     args
      .url
      .or(file_cfg.url)
      .unwrap_or_else(|| "http://localhost:8000".to_string()),
    timeout_secs: 180,
  };
  let consultant_id = args.consultant.or(file_cfg.consultant_id).unwrap_or(1);
  let output = args
    .output
    .or(file_cfg.output)
    .unwrap_or_else(|| PathBuf::from("Meeting_Minutes.txt"));

  let client = ApiClient::new(api_config)?;
  let mut app = App::new(client, consultant_id, output);

  println!("Meeting minutes assistant. /generate, /new, /quit");
  app.start().await?;
  run_loop(&mut app).await
}

async fn run_loop(app: &mut App) -> Result<()> {
  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    print!("> ");
    std::io::stdout().flush().ok();

    let Some(line) = lines.next_line().await.context("reading stdin")? else {
      break;
    };

    let result = match Command::parse(&line) {
      Command::Quit => break,
      Command::New => app.start().await,
      Command::Generate => app.generate().await,
      Command::Say(text) => app.say(&text).await,
    };

    if let Err(e) = result {
      tracing::warn!(session_id = ?app.session_id(), "{e:#}");
      eprintln!("warning: {e:#}");
    }
  }
  Ok(())
}
