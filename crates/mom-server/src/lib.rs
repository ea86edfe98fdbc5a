//! Configuration and wiring for the minutes assistant server.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use mom_core::{generator::GenerationSettings, orchestrator::TurnSettings};
use mom_openai::OpenAiConfig;
use serde::Deserialize;

/// Server configuration, deserialised from `config.toml` and `MOM_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Path to the SQLite database file. A leading `~/` is expanded.
  pub store_path:         PathBuf,
  /// Name given to the consultant seeded into an empty database.
  pub default_consultant: String,
  pub openai:             OpenAiConfig,
  pub conversation:       TurnSettings,
  pub minutes:            GenerationSettings,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8000,
      store_path:         PathBuf::from("mom_database.db"),
      default_consultant: "Consultant".to_string(),
      openai:             OpenAiConfig::default(),
      conversation:       TurnSettings::default(),
      minutes:            GenerationSettings::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Layer the optional TOML file at `path` under `MOM_`-prefixed environment
/// variables (`MOM_OPENAI__MODEL` sets `openai.model`).
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("MOM")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
