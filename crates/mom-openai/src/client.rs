//! [`OpenAiClient`]: a thin async client for the Chat Completions endpoint.

use std::{env, time::Duration};

use mom_core::completion::{CompletionRequest, CompletionService, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings, deserialised from the `[openai]` config table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
  /// Empty means "read `OPENAI_API_KEY` from the environment".
  pub api_key:      String,
  pub base_url:     String,
  /// Used when a request does not name a model.
  pub model:        String,
  pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
  fn default() -> Self {
    Self {
      api_key:      String::new(),
      base_url:     "https://api.openai.com/v1".to_string(),
      model:        "gpt-4o-mini".to_string(),
      timeout_secs: 60,
    }
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for the OpenAI Chat Completions API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenAiClient {
  client: Client,
  config: OpenAiConfig,
}

impl OpenAiClient {
  /// Build a client. An empty `api_key` falls back to `OPENAI_API_KEY`.
  pub fn new(mut config: OpenAiConfig) -> Result<Self> {
    if config.api_key.is_empty() {
      config.api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
    }
    if config.api_key.is_empty() {
      return Err(Error::MissingApiKey);
    }
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn endpoint(&self) -> String {
    format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
  }

  fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(WireMessage { role: "system", content: &request.system_prompt });
    messages.extend(request.history.iter().map(|m| WireMessage {
      role:    role_name(m.role),
      content: &m.text,
    }));
    messages.push(WireMessage { role: "user", content: &request.input });

    ChatCompletionBody {
      model: request.model.as_deref().unwrap_or(&self.config.model),
      messages,
      temperature: request.temperature,
      max_tokens: request.max_output_tokens,
    }
  }

  async fn send(&self, request: &CompletionRequest) -> Result<String> {
    let body = self.build_body(request);
    debug!(model = body.model, messages = body.messages.len(), "sending chat completion");

    let response = self
      .client
      .post(self.endpoint())
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), message: error_message(&text) });
    }

    let parsed: ChatCompletionResponse = response.json().await?;
    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .ok_or(Error::EmptyResponse)
  }
}

impl CompletionService for OpenAiClient {
  type Error = Error;

  async fn complete(&self, request: CompletionRequest) -> Result<String> {
    self.send(&request).await
  }
}

fn role_name(role: Role) -> &'static str {
  match role {
    Role::System => "system",
    Role::User => "user",
    Role::Assistant => "assistant",
  }
}

/// Pull `error.message` out of an OpenAI error body, or return the raw text.
fn error_message(body: &str) -> String {
  serde_json::from_str::<ErrorResponse>(body)
    .map(|wrapper| wrapper.error.message)
    .unwrap_or_else(|_| body.to_string())
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
  model:       &'a str,
  messages:    Vec<WireMessage<'a>>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens:  Option<u32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
  role:    &'static str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
  content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
  error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
  use mom_core::completion::ChatMessage;
  use serde_json::{Value, json};

  use super::*;

  fn config(base_url: &str) -> OpenAiConfig {
    OpenAiConfig {
      api_key: "sk-test".into(),
      base_url: base_url.into(),
      ..OpenAiConfig::default()
    }
  }

  fn request() -> CompletionRequest {
    CompletionRequest {
      system_prompt:     "You are an interviewer.".into(),
      history:           vec![ChatMessage::user("Acme"), ChatMessage::assistant("Who attended?")],
      input:             "Alice".into(),
      model:             None,
      temperature:       0.7,
      max_output_tokens: None,
    }
  }

  /// Serve `reply` with `status` from a local stub, recording request bodies.
  async fn stub(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
      .route(
        "/v1/chat/completions",
        post(
          move |State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| {
            let reply = reply.clone();
            async move {
              seen.lock().unwrap().push(body);
              (status, Json(reply))
            }
          },
        ),
      )
      .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}/v1/"), seen)
  }

  #[test]
  fn missing_key_is_rejected() {
    let cfg = OpenAiConfig { api_key: String::new(), ..OpenAiConfig::default() };
    // Only meaningful when the variable is not set in the test environment.
    if env::var("OPENAI_API_KEY").is_err() {
      assert!(matches!(OpenAiClient::new(cfg), Err(Error::MissingApiKey)));
    }
  }

  #[test]
  fn body_orders_system_history_then_input() {
    let client = OpenAiClient::new(config("http://unused")).unwrap();
    let req = request();
    let body = serde_json::to_value(client.build_body(&req)).unwrap();

    assert_eq!(body["model"], "gpt-4o-mini");
    assert!(body.get("max_tokens").is_none());
    let roles: Vec<_> = body["messages"]
      .as_array()
      .unwrap()
      .iter()
      .map(|m| m["role"].as_str().unwrap())
      .collect();
    assert_eq!(roles, ["system", "user", "assistant", "user"]);
    assert_eq!(body["messages"][3]["content"], "Alice");
  }

  #[test]
  fn request_model_and_token_cap_override_defaults() {
    let client = OpenAiClient::new(config("http://unused")).unwrap();
    let mut req = request();
    req.model = Some("gpt-4".into());
    req.max_output_tokens = Some(2000);
    let body = serde_json::to_value(client.build_body(&req)).unwrap();
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["max_tokens"], 2000);
  }

  #[test]
  fn error_message_prefers_structured_body() {
    let body = r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#;
    assert_eq!(error_message(body), "Rate limit reached");
    assert_eq!(error_message("bad gateway"), "bad gateway");
  }

  #[tokio::test]
  async fn completes_against_stub_server() {
    let (url, seen) = stub(
      StatusCode::OK,
      json!({ "choices": [{ "message": { "role": "assistant", "content": "Where was it held?" } }] }),
    )
    .await;
    let client = OpenAiClient::new(config(&url)).unwrap();

    let text = client.complete(request()).await.unwrap();
    assert_eq!(text, "Where was it held?");

    let bodies = seen.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["messages"].as_array().unwrap().len(), 4);
  }

  #[tokio::test]
  async fn http_error_surfaces_status_and_message() {
    let (url, _) = stub(
      StatusCode::TOO_MANY_REQUESTS,
      json!({ "error": { "message": "slow down" } }),
    )
    .await;
    let client = OpenAiClient::new(config(&url)).unwrap();

    match client.complete(request()).await {
      Err(Error::Status { status, message }) => {
        assert_eq!(status, 429);
        assert_eq!(message, "slow down");
      }
      other => panic!("expected status error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn missing_content_is_an_empty_response() {
    let (url, _) = stub(StatusCode::OK, json!({ "choices": [] })).await;
    let client = OpenAiClient::new(config(&url)).unwrap();
    assert!(matches!(client.complete(request()).await, Err(Error::EmptyResponse)));
  }
}
