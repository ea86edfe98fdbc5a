//! Conversation Orchestrator: drives one interview turn at a time.
//!
//! A turn never fails from the caller's point of view: every fault is logged
//! and folded into a [`TurnResponse`] carrying an apology and a [`TurnError`]
//! kind, so a chat front-end can keep going after a bad turn.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use thiserror::Error;
use tracing::{error, warn};

use crate::{
  completion::{CompletionRequest, CompletionService},
  error::BoxError,
  prompts,
  record::{ConsultantId, NewQaPair, SessionId},
  state::{Exchange, SessionStateStore},
  store::RecordStore,
  tracker::SessionTracker,
};

// ─── Settings ────────────────────────────────────────────────────────────────

/// Completion parameters for interview turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnSettings {
  /// `None` uses the completion backend's default model.
  pub model:             Option<String>,
  pub temperature:       f32,
  pub max_output_tokens: Option<u32>,
}

impl Default for TurnSettings {
  fn default() -> Self {
    Self { model: None, temperature: 0.7, max_output_tokens: None }
  }
}

// ─── Request / response ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
  pub input:         String,
  /// `None` starts a new session.
  #[serde(default)]
  pub session_id:    Option<SessionId>,
  pub consultant_id: ConsultantId,
}

/// What kind of reply a turn produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
  /// The interview continues.
  Conversation,
  /// The model presented finished minutes; `minutes` is the document body.
  FinalMinutes { minutes: String },
}

impl Reply {
  /// Classify a model reply. Finished minutes are announced by a heading;
  /// the body is whatever follows the first blank line.
  pub fn from_model_text(text: &str) -> Self {
    if !text.contains(prompts::FINAL_MINUTES_MARKER) {
      return Self::Conversation;
    }
    let minutes = match text.split_once("\n\n") {
      Some((_, body)) => body,
      None => text,
    };
    Self::FinalMinutes { minutes: minutes.to_string() }
  }
}

/// Why a turn fell back to an apology.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TurnError {
  /// The completion service failed.
  LlmError,
  /// Anything else: storage, unknown session, state cache.
  GeneralError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
  pub response:   String,
  /// `None` only when a new session could not be created.
  pub session_id: Option<SessionId>,
  pub reply:      Reply,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:      Option<TurnError>,
}

impl TurnResponse {
  fn reply(session_id: SessionId, text: String) -> Self {
    Self {
      reply:      Reply::from_model_text(&text),
      response:   text,
      session_id: Some(session_id),
      error:      None,
    }
  }

  fn canned(session_id: SessionId, text: impl Into<String>) -> Self {
    Self {
      response:   text.into(),
      session_id: Some(session_id),
      reply:      Reply::Conversation,
      error:      None,
    }
  }

  fn failed(session_id: Option<SessionId>, kind: TurnError) -> Self {
    let response = match kind {
      TurnError::LlmError => prompts::LLM_ERROR_REPLY,
      TurnError::GeneralError => prompts::GENERAL_ERROR_REPLY,
    };
    Self {
      response: response.to_string(),
      session_id,
      reply: Reply::Conversation,
      error: Some(kind),
    }
  }
}

// ─── Internal fault ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum TurnFault {
  #[error("completion failed: {0}")]
  Completion(#[source] BoxError),
  #[error("{0}")]
  Other(#[source] BoxError),
}

impl TurnFault {
  fn other(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Other(Box::new(e))
  }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

pub struct Orchestrator<S, C, K> {
  store:      Arc<S>,
  completion: Arc<C>,
  state:      Arc<K>,
  tracker:    SessionTracker<S, K>,
  settings:   TurnSettings,
  /// One async lock per session so turns for a session never interleave.
  turn_locks: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S, C, K> Orchestrator<S, C, K>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  pub fn new(
    store: Arc<S>,
    completion: Arc<C>,
    state: Arc<K>,
    settings: TurnSettings,
  ) -> Self {
    Self {
      tracker: SessionTracker::new(store.clone(), state.clone()),
      store,
      completion,
      state,
      settings,
      turn_locks: Mutex::new(HashMap::new()),
    }
  }

  pub fn tracker(&self) -> &SessionTracker<S, K> { &self.tracker }

  /// Handle one user message. Never returns an error; see the module docs.
  pub async fn handle_turn(&self, request: TurnRequest) -> TurnResponse {
    let TurnRequest { input, session_id, consultant_id } = request;

    let session_id = match session_id {
      Some(id) => match self.session_exists(id).await {
        Ok(true) => id,
        Ok(false) => {
          warn!(session_id = id, "turn for unknown session");
          return TurnResponse::failed(Some(id), TurnError::GeneralError);
        }
        Err(e) => {
          error!(session_id = id, error = %e, "failed to look up session");
          return TurnResponse::failed(Some(id), TurnError::GeneralError);
        }
      },
      None => match self.tracker.start(consultant_id).await {
        Ok(id) => id,
        Err(e) => {
          error!(consultant_id, error = %e, "failed to start session");
          return TurnResponse::failed(None, TurnError::GeneralError);
        }
      },
    };

    if prompts::is_trigger(&input) {
      return TurnResponse::canned(session_id, prompts::greeting());
    }
    if input.is_empty() {
      return TurnResponse::canned(session_id, prompts::EMPTY_INPUT_REPLY);
    }

    let lock = self.turn_lock(session_id);
    let outcome = {
      let _guard = lock.lock().await;
      self.converse(session_id, input).await
    };
    self.release_turn_lock(session_id, lock);

    match outcome {
      Ok(text) => TurnResponse::reply(session_id, text),
      Err(TurnFault::Completion(e)) => {
        error!(session_id, error = %e, "error in LLM interaction");
        TurnResponse::failed(Some(session_id), TurnError::LlmError)
      }
      Err(TurnFault::Other(e)) => {
        error!(session_id, error = %e, "error processing turn");
        TurnResponse::failed(Some(session_id), TurnError::GeneralError)
      }
    }
  }

  /// Persist the input, ask the model, and remember the exchange.
  async fn converse(
    &self,
    session_id: SessionId,
    input: String,
  ) -> Result<String, TurnFault> {
    self
      .store
      .store_qa(NewQaPair::new(
        session_id,
        prompts::USER_RESPONSE_LABEL,
        input.clone(),
      ))
      .await
      .map_err(TurnFault::other)?;

    let history = self.state.history(session_id).await.map_err(TurnFault::other)?;
    let request = CompletionRequest {
      system_prompt:     prompts::interview_system_prompt(),
      history:           CompletionRequest::history_from_exchanges(&history),
      input:             input.clone(),
      model:             self.settings.model.clone(),
      temperature:       self.settings.temperature,
      max_output_tokens: self.settings.max_output_tokens,
    };

    let output = self
      .completion
      .complete(request)
      .await
      .map_err(|e| TurnFault::Completion(Box::new(e)))?;

    self
      .state
      .append_exchange(session_id, Exchange { input, output: output.clone() })
      .await
      .map_err(TurnFault::other)?;

    Ok(output)
  }

  async fn session_exists(&self, session_id: SessionId) -> Result<bool, S::Error> {
    Ok(self.store.get_session(session_id).await?.is_some())
  }

  fn turn_lock(&self, session_id: SessionId) -> Arc<tokio::sync::Mutex<()>> {
    self
      .turn_locks
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(session_id)
      .or_default()
      .clone()
  }

  /// Drop the map entry for `session_id` unless another turn still holds
  /// or waits on `lock`.
  fn release_turn_lock(&self, session_id: SessionId, lock: Arc<tokio::sync::Mutex<()>>) {
    let mut locks = self.turn_locks.lock().unwrap_or_else(PoisonError::into_inner);
    // Ours plus the map's.
    if Arc::strong_count(&lock) == 2 {
      locks.remove(&session_id);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use tokio::sync::Notify;

  use super::*;
  use crate::{
    completion::Role,
    state::MemoryStateStore,
    testing::{MemoryRecordStore, ScriptedCompletion},
  };

  type TestOrchestrator =
    Orchestrator<MemoryRecordStore, ScriptedCompletion, MemoryStateStore>;

  async fn orchestrator(completion: ScriptedCompletion) -> TestOrchestrator {
    let store = MemoryRecordStore::default();
    store.add_consultant("Dana".into()).await.unwrap();
    Orchestrator::new(
      Arc::new(store),
      Arc::new(completion),
      Arc::new(MemoryStateStore::new()),
      TurnSettings::default(),
    )
  }

  fn turn(input: &str, session_id: Option<SessionId>) -> TurnRequest {
    TurnRequest { input: input.into(), session_id, consultant_id: 1 }
  }

  #[tokio::test]
  async fn trigger_starts_session_without_persisting() {
    let o = orchestrator(ScriptedCompletion::default()).await;
    let resp = o.handle_turn(turn("I need to make mom", None)).await;

    assert!(resp.response.contains("What is the name of the company?"));
    assert_eq!(resp.error, None);
    let id = resp.session_id.unwrap();
    assert!(o.store.get_qa_pairs(id).await.unwrap().is_empty());
    assert!(o.completion.requests().is_empty());
    assert!(o.tracker.flags(id).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn trigger_matches_minutes_in_any_case() {
    let o = orchestrator(ScriptedCompletion::default()).await;
    let first = o.handle_turn(turn("need to make mom", None)).await;
    let id = first.session_id;
    let resp = o.handle_turn(turn("Let's write the MINUTES", id)).await;
    assert_eq!(resp.response, prompts::greeting());
    assert_eq!(resp.session_id, id);
  }

  #[tokio::test]
  async fn answer_is_persisted_and_reply_returned_verbatim() {
    let o = orchestrator(ScriptedCompletion::default().reply("Who was present?")).await;
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;

    let resp = o.handle_turn(turn("Acme Corp", id)).await;
    assert_eq!(resp.response, "Who was present?");
    assert_eq!(resp.reply, Reply::Conversation);
    assert_eq!(resp.error, None);

    let pairs = o.store.get_qa_pairs(id.unwrap()).await.unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].question, "user_response");
    assert_eq!(pairs[0].answer, "Acme Corp");
  }

  #[tokio::test]
  async fn history_is_sent_on_later_turns() {
    let o = orchestrator(
      ScriptedCompletion::default().reply("Who was present?").reply("Where?"),
    )
    .await;
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;
    o.handle_turn(turn("Acme", id)).await;
    o.handle_turn(turn("Alice and Bob", id)).await;

    let requests = o.completion.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].history.is_empty());
    assert_eq!(requests[1].input, "Alice and Bob");
    assert_eq!(
      requests[1]
        .history
        .iter()
        .map(|m| (m.role, m.text.as_str()))
        .collect::<Vec<_>>(),
      [(Role::User, "Acme"), (Role::Assistant, "Who was present?")]
    );
    assert!(requests[1].system_prompt.contains("*Essential Questions:*"));
    assert_eq!(requests[1].temperature, 0.7);
  }

  #[tokio::test]
  async fn llm_failure_is_recovered_after_persisting() {
    let o = orchestrator(ScriptedCompletion::default().fail("boom")).await;
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;

    let resp = o.handle_turn(turn("Acme", id)).await;
    assert_eq!(resp.error, Some(TurnError::LlmError));
    assert!(!resp.response.is_empty());
    assert_eq!(resp.session_id, id);
    assert_eq!(o.store.get_qa_pairs(id.unwrap()).await.unwrap().len(), 1);
    // Failed exchanges are not remembered.
    assert!(o.state.history(id.unwrap()).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn store_failure_is_a_general_error() {
    let o = orchestrator(ScriptedCompletion::default().reply("unused")).await;
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;
    o.store.fail_writes(true);

    let resp = o.handle_turn(turn("Acme", id)).await;
    assert_eq!(resp.error, Some(TurnError::GeneralError));
    assert_eq!(resp.response, prompts::GENERAL_ERROR_REPLY);
    assert!(o.completion.requests().is_empty());
  }

  #[tokio::test]
  async fn failing_to_start_a_session_reports_no_id() {
    let o = orchestrator(ScriptedCompletion::default()).await;
    let resp = o
      .handle_turn(TurnRequest { input: "hi".into(), session_id: None, consultant_id: 42 })
      .await;
    assert_eq!(resp.error, Some(TurnError::GeneralError));
    assert_eq!(resp.session_id, None);
  }

  #[tokio::test]
  async fn unknown_session_is_a_general_error() {
    let o = orchestrator(ScriptedCompletion::default().reply("unused")).await;
    let resp = o.handle_turn(turn("Acme", Some(404))).await;
    assert_eq!(resp.error, Some(TurnError::GeneralError));
    assert_eq!(resp.session_id, Some(404));
    assert!(o.completion.requests().is_empty());
  }

  #[tokio::test]
  async fn trigger_on_unknown_session_is_a_general_error() {
    let o = orchestrator(ScriptedCompletion::default()).await;
    let resp = o.handle_turn(turn("need to make mom", Some(404))).await;
    assert_eq!(resp.error, Some(TurnError::GeneralError));
    assert_eq!(resp.response, prompts::GENERAL_ERROR_REPLY);
    assert_eq!(resp.session_id, Some(404));
  }

  #[tokio::test]
  async fn unknown_sessions_leave_no_turn_locks() {
    let o = orchestrator(ScriptedCompletion::default()).await;
    for id in 1000..1200 {
      let resp = o.handle_turn(turn("Acme", Some(id))).await;
      assert_eq!(resp.error, Some(TurnError::GeneralError));
    }
    assert!(o.turn_locks.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn turn_locks_are_released_after_each_turn() {
    let o = orchestrator(ScriptedCompletion::default().reply("Who?").fail("down")).await;
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;
    o.handle_turn(turn("Acme", id)).await;
    o.handle_turn(turn("Alice", id)).await;
    assert!(o.turn_locks.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn empty_input_is_reprompted_without_side_effects() {
    let o = orchestrator(ScriptedCompletion::default()).await;
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;

    let resp = o.handle_turn(turn("", id)).await;
    assert_eq!(resp.response, prompts::EMPTY_INPUT_REPLY);
    assert_eq!(resp.error, None);
    assert!(o.store.get_qa_pairs(id.unwrap()).await.unwrap().is_empty());
    assert!(o.completion.requests().is_empty());
  }

  #[tokio::test]
  async fn whitespace_input_is_a_normal_turn() {
    let o =
      orchestrator(ScriptedCompletion::default().reply("Sorry, could you repeat?")).await;
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;

    let resp = o.handle_turn(turn("   ", id)).await;
    assert_eq!(resp.response, "Sorry, could you repeat?");
    let pairs = o.store.get_qa_pairs(id.unwrap()).await.unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].answer, "   ");
    assert_eq!(o.completion.requests()[0].input, "   ");
  }

  /// Parks the first completion until `gate` is notified.
  #[derive(Default)]
  struct GatedCompletion {
    gate:     Notify,
    calls:    AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
  }

  impl CompletionService for GatedCompletion {
    type Error = std::convert::Infallible;

    async fn complete(
      &self,
      request: CompletionRequest,
    ) -> Result<String, std::convert::Infallible> {
      self.requests.lock().unwrap().push(request);
      let n = self.calls.fetch_add(1, Ordering::SeqCst);
      if n == 0 {
        self.gate.notified().await;
      }
      Ok(format!("reply {n}"))
    }
  }

  #[tokio::test]
  async fn turns_for_one_session_run_one_at_a_time() {
    let store = MemoryRecordStore::default();
    store.add_consultant("Dana".into()).await.unwrap();
    let o = Orchestrator::new(
      Arc::new(store),
      Arc::new(GatedCompletion::default()),
      Arc::new(MemoryStateStore::new()),
      TurnSettings::default(),
    );
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;

    let release = async {
      for _ in 0..10 {
        tokio::task::yield_now().await;
      }
      // The second turn is still waiting behind the parked first one.
      assert_eq!(o.completion.requests.lock().unwrap().len(), 1);
      o.completion.gate.notify_one();
    };
    let (first, second, ()) = tokio::join!(
      o.handle_turn(turn("first", id)),
      o.handle_turn(turn("second", id)),
      release,
    );

    assert_eq!(first.response, "reply 0");
    assert_eq!(second.response, "reply 1");
    {
      let requests = o.completion.requests.lock().unwrap();
      assert!(requests[0].history.is_empty());
      assert_eq!(requests[1].input, "second");
      assert_eq!(
        requests[1]
          .history
          .iter()
          .map(|m| (m.role, m.text.as_str()))
          .collect::<Vec<_>>(),
        [(Role::User, "first"), (Role::Assistant, "reply 0")]
      );
    }
    assert!(o.turn_locks.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn final_minutes_reply_is_flagged() {
    let text = "Final Meeting Minutes\n\n## Meeting Minutes (MoM)\nCompany: Acme";
    let o = orchestrator(ScriptedCompletion::default().reply(text)).await;
    let id = o.handle_turn(turn("need to make mom", None)).await.session_id;

    let resp = o.handle_turn(turn("No, that's everything", id)).await;
    assert_eq!(resp.response, text);
    assert_eq!(resp.reply, Reply::FinalMinutes {
      minutes: "## Meeting Minutes (MoM)\nCompany: Acme".into(),
    });
  }

  #[test]
  fn final_minutes_without_blank_line_keeps_whole_text() {
    let reply = Reply::from_model_text("Here are the Final Meeting Minutes: ...");
    assert_eq!(reply, Reply::FinalMinutes {
      minutes: "Here are the Final Meeting Minutes: ...".into(),
    });
  }

  #[test]
  fn turn_error_serializes_as_snake_case() {
    assert_eq!(serde_json::to_string(&TurnError::LlmError).unwrap(), r#""llm_error""#);
    assert_eq!(TurnError::GeneralError.to_string(), "general_error");
  }
}
