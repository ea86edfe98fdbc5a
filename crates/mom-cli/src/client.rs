//! Async HTTP client wrapping the minutes JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use mom_core::{
  generator::GeneratedMinutes,
  orchestrator::{TurnRequest, TurnResponse},
  record::{ConsultantId, SessionId},
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Connection settings for the minutes API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:     String,
  /// Minutes generation waits on the model, so this is generous.
  pub timeout_secs: u64,
}

/// Async HTTP client for the minutes REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Turns ─────────────────────────────────────────────────────────────────

  /// `POST /api/turns`
  pub async fn turn(
    &self,
    input: &str,
    session_id: Option<SessionId>,
    consultant_id: ConsultantId,
  ) -> Result<TurnResponse> {
    let body = TurnRequest { input: input.to_string(), session_id, consultant_id };
    let resp = self
      .client
      .post(self.url("/turns"))
      .json(&body)
      .send()
      .await
      .context("POST /turns failed")?;
    decode(resp, "POST /turns").await
  }

  // ── Minutes ───────────────────────────────────────────────────────────────

  /// `POST /api/sessions/<id>/minutes`
  pub async fn generate_minutes(&self, session_id: SessionId) -> Result<GeneratedMinutes> {
    let path = format!("/sessions/{session_id}/minutes");
    let resp = self
      .client
      .post(self.url(&path))
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    decode(resp, &format!("POST {path}")).await
  }
}

/// Deserialise a success body, or surface the API's `{"error": ...}` message.
async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if !status.is_success() {
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
      .ok()
      .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
      .unwrap_or(text);
    return Err(anyhow!("{what} → {status}: {message}"));
  }
  resp.json().await.with_context(|| format!("deserialising {what} response"))
}
