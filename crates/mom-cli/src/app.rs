//! Chat loop state: the current session and what each input line means.

use std::path::PathBuf;

use anyhow::{Context, Result};
use mom_core::{
  orchestrator::{Reply, TurnResponse},
  prompts::FINAL_MINUTES_MARKER,
  record::{ConsultantId, SessionId},
};

use crate::client::ApiClient;

/// The phrase sent to open every interview.
pub const OPENING_TRIGGER: &str = "need to make mom";

/// A parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
  /// Forwarded to the interviewer as a turn.
  Say(String),
  Generate,
  New,
  Quit,
}

impl Command {
  pub fn parse(line: &str) -> Self {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
      "/quit" | "exit" => Self::Quit,
      "/new" => Self::New,
      "/generate" => Self::Generate,
      _ => Self::Say(trimmed.to_string()),
    }
  }
}

pub struct App {
  client:        ApiClient,
  consultant_id: ConsultantId,
  output:        PathBuf,
  session_id:    Option<SessionId>,
}

impl App {
  pub fn new(client: ApiClient, consultant_id: ConsultantId, output: PathBuf) -> Self {
    Self { client, consultant_id, output, session_id: None }
  }

  pub fn session_id(&self) -> Option<SessionId> { self.session_id }

  /// Open a fresh interview and print the greeting.
  pub async fn start(&mut self) -> Result<()> {
    self.session_id = None;
    self.say(OPENING_TRIGGER).await
  }

  /// Send one turn and print the reply. Minutes in the reply are saved.
  pub async fn say(&mut self, input: &str) -> Result<()> {
    let resp = self
      .client
      .turn(input, self.session_id, self.consultant_id)
      .await?;
    self.absorb(&resp);
    println!("\n{}\n", resp.response);

    if let Reply::FinalMinutes { minutes } = &resp.reply {
      self.save_minutes(minutes).await?;
    }
    Ok(())
  }

  /// Ask the server to write up the current session.
  pub async fn generate(&mut self) -> Result<()> {
    let Some(session_id) = self.session_id else {
      println!("No active session; type /new to start one.");
      return Ok(());
    };
    println!("Generating minutes...");
    let minutes = self.client.generate_minutes(session_id).await?;
    println!("\n## {FINAL_MINUTES_MARKER}\n\n{}\n", minutes.content);
    self.save_minutes(&minutes.content).await
  }

  fn absorb(&mut self, resp: &TurnResponse) {
    if let Some(err) = resp.error {
      tracing::warn!(error = %err, "turn fell back to an apology");
    }
    if resp.session_id.is_some() {
      self.session_id = resp.session_id;
    }
  }

  async fn save_minutes(&self, content: &str) -> Result<()> {
    save_minutes(&self.output, content).await?;
    println!("Minutes saved to {}", self.output.display());
    Ok(())
  }
}

pub async fn save_minutes(path: &std::path::Path, content: &str) -> Result<()> {
  tokio::fs::write(path, content)
    .await
    .with_context(|| format!("writing minutes to {}", path.display()))
}
