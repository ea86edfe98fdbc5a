//! Document Generator: compiles a session's answers into Meeting Minutes.
//!
//! Unlike turn handling, failures here are returned to the caller: a minutes
//! document must never silently come out empty or wrong. Once the document
//! is saved the call succeeds; closing the session and setting the flag
//! afterwards only log on failure.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  classify::ClassifiedRecord,
  completion::{CompletionRequest, CompletionService},
  prompts,
  record::{DocumentId, SessionId},
  state::SessionStateStore,
  store::RecordStore,
  tracker::SessionTracker,
};

/// Completion parameters for the minutes call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
  pub model:             Option<String>,
  pub temperature:       f32,
  pub max_output_tokens: Option<u32>,
}

impl Default for GenerationSettings {
  fn default() -> Self {
    Self {
      model:             Some("gpt-4".to_string()),
      temperature:       0.7,
      max_output_tokens: Some(2000),
    }
  }
}

/// A freshly generated and persisted minutes document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMinutes {
  pub document_id: DocumentId,
  pub content:     String,
}

pub struct DocumentGenerator<S, C, K> {
  store:      Arc<S>,
  completion: Arc<C>,
  tracker:    SessionTracker<S, K>,
  settings:   GenerationSettings,
}

impl<S, C, K> DocumentGenerator<S, C, K>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  pub fn new(
    store: Arc<S>,
    completion: Arc<C>,
    state: Arc<K>,
    settings: GenerationSettings,
  ) -> Self {
    Self {
      tracker: SessionTracker::new(store.clone(), state),
      store,
      completion,
      settings,
    }
  }

  /// The classified answers for a session, as they would be fed to the
  /// model.
  pub async fn record(&self, session_id: SessionId) -> Result<ClassifiedRecord> {
    let pairs = self
      .store
      .get_qa_pairs(session_id)
      .await
      .map_err(Error::store)?;
    let record = ClassifiedRecord::from_pairs(&pairs);
    debug!(session_id, ?record, "folded interview answers");
    Ok(record)
  }

  /// Generate, persist, and return minutes for `session_id`.
  pub async fn generate(&self, session_id: SessionId) -> Result<GeneratedMinutes> {
    let result = self.try_generate(session_id).await;
    if let Err(e) = &result {
      error!(session_id, error = %e, "error generating minutes");
    }
    result
  }

  async fn try_generate(&self, session_id: SessionId) -> Result<GeneratedMinutes> {
    self
      .store
      .get_session(session_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::SessionNotFound(session_id))?;

    let interview_data = self.record(session_id).await?.render();
    let request = CompletionRequest {
      system_prompt:     prompts::MINUTES_SYSTEM_ROLE.to_string(),
      history:           Vec::new(),
      input:             prompts::minutes_prompt(&interview_data),
      model:             self.settings.model.clone(),
      temperature:       self.settings.temperature,
      max_output_tokens: self.settings.max_output_tokens,
    };

    let content = self
      .completion
      .complete(request)
      .await
      .map_err(Error::completion)?;

    let document = self
      .store
      .save_document(session_id, content)
      .await
      .map_err(Error::store)?;
    info!(session_id, document_id = document.id, "saved minutes document");

    // The document exists from here on; later failures only warn.
    if let Err(e) = self.store.close_session(session_id).await {
      warn!(session_id, error = %e, "minutes saved but session not closed");
    }
    if let Err(e) = self.tracker.mark_minutes_generated(session_id).await {
      warn!(session_id, error = %e, "minutes saved but flag not set");
    }

    Ok(GeneratedMinutes { document_id: document.id, content: document.content })
  }
}
