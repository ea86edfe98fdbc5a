//! The `CompletionService` trait and its request types.
//!
//! The service is used in two shapes: chat-style turns that carry the
//! session's conversation history, and single-shot requests (minutes
//! generation) with an empty history.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::state::Exchange;

/// Who authored a message in a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role: Role,
  pub text: String,
}

impl ChatMessage {
  pub fn user(text: impl Into<String>) -> Self {
    Self { role: Role::User, text: text.into() }
  }

  pub fn assistant(text: impl Into<String>) -> Self {
    Self { role: Role::Assistant, text: text.into() }
  }
}

/// One request to the text-completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
  pub system_prompt:     String,
  /// Prior messages, oldest first. Never contains the system prompt or the
  /// new input.
  pub history:           Vec<ChatMessage>,
  pub input:             String,
  /// Overrides the backend's default model when set.
  pub model:             Option<String>,
  pub temperature:       f32,
  pub max_output_tokens: Option<u32>,
}

impl CompletionRequest {
  /// Flatten stored exchanges into alternating user/assistant messages.
  pub fn history_from_exchanges(exchanges: &[Exchange]) -> Vec<ChatMessage> {
    exchanges
      .iter()
      .flat_map(|ex| {
        [ChatMessage::user(&ex.input), ChatMessage::assistant(&ex.output)]
      })
      .collect()
  }
}

/// Abstraction over an external text-generation backend.
pub trait CompletionService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run one completion and return the generated text.
  fn complete(
    &self,
    request: CompletionRequest,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}
