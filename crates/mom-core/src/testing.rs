//! In-memory doubles for the collaborator traits, shared by unit tests.

use std::{
  collections::VecDeque,
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use thiserror::Error;

use crate::{
  completion::{CompletionRequest, CompletionService},
  record::{
    Consultant, ConsultantId, Document, DocumentId, NewQaPair, QaPair, Session,
    SessionId, SessionStatus,
  },
  state::{Exchange, Flag, SessionFlags, SessionStateStore},
  store::RecordStore,
};

#[derive(Debug, Error)]
pub enum TestStoreError {
  #[error("store unavailable")]
  Unavailable,
  #[error("no such consultant: {0}")]
  MissingConsultant(ConsultantId),
  #[error("no such session: {0}")]
  MissingSession(SessionId),
}

#[derive(Default)]
struct Tables {
  consultants: Vec<Consultant>,
  sessions:    Vec<Session>,
  qa_pairs:    Vec<QaPair>,
  documents:   Vec<Document>,
}

/// A [`RecordStore`] over plain vectors. Ids start at 1, like SQLite rowids.
#[derive(Default)]
pub struct MemoryRecordStore {
  tables:      Mutex<Tables>,
  fail_writes: AtomicBool,
  fail_reads:  AtomicBool,
}

impl MemoryRecordStore {
  pub fn fail_writes(&self, on: bool) { self.fail_writes.store(on, Ordering::SeqCst); }

  pub fn fail_reads(&self, on: bool) { self.fail_reads.store(on, Ordering::SeqCst); }

  fn write_check(&self) -> Result<(), TestStoreError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(TestStoreError::Unavailable);
    }
    Ok(())
  }

  fn read_check(&self) -> Result<(), TestStoreError> {
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(TestStoreError::Unavailable);
    }
    Ok(())
  }

  fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
    self.tables.lock().unwrap()
  }
}

fn next_id(len: usize) -> i64 { len as i64 + 1 }

impl RecordStore for MemoryRecordStore {
  type Error = TestStoreError;

  async fn add_consultant(&self, name: String) -> Result<Consultant, TestStoreError> {
    self.write_check()?;
    let mut t = self.tables();
    let consultant = Consultant { id: next_id(t.consultants.len()), name };
    t.consultants.push(consultant.clone());
    Ok(consultant)
  }

  async fn get_consultant(
    &self,
    id: ConsultantId,
  ) -> Result<Option<Consultant>, TestStoreError> {
    self.read_check()?;
    Ok(self.tables().consultants.iter().find(|c| c.id == id).cloned())
  }

  async fn list_consultants(&self) -> Result<Vec<Consultant>, TestStoreError> {
    self.read_check()?;
    Ok(self.tables().consultants.clone())
  }

  async fn create_session(
    &self,
    consultant_id: ConsultantId,
  ) -> Result<Session, TestStoreError> {
    self.write_check()?;
    let mut t = self.tables();
    if !t.consultants.iter().any(|c| c.id == consultant_id) {
      return Err(TestStoreError::MissingConsultant(consultant_id));
    }
    let session = Session {
      id: next_id(t.sessions.len()),
      consultant_id,
      start_time: Utc::now(),
      status: SessionStatus::Active,
    };
    t.sessions.push(session.clone());
    Ok(session)
  }

  async fn get_session(&self, id: SessionId) -> Result<Option<Session>, TestStoreError> {
    self.read_check()?;
    Ok(self.tables().sessions.iter().find(|s| s.id == id).cloned())
  }

  async fn list_sessions(
    &self,
    consultant_id: Option<ConsultantId>,
  ) -> Result<Vec<Session>, TestStoreError> {
    self.read_check()?;
    Ok(
      self
        .tables()
        .sessions
        .iter()
        .filter(|s| consultant_id.is_none_or(|c| s.consultant_id == c))
        .cloned()
        .collect(),
    )
  }

  async fn close_session(&self, id: SessionId) -> Result<bool, TestStoreError> {
    self.write_check()?;
    let mut t = self.tables();
    Ok(match t.sessions.iter_mut().find(|s| s.id == id) {
      Some(s) => {
        s.status = SessionStatus::Closed;
        true
      }
      None => false,
    })
  }

  async fn store_qa(&self, input: NewQaPair) -> Result<QaPair, TestStoreError> {
    self.write_check()?;
    let mut t = self.tables();
    if !t.sessions.iter().any(|s| s.id == input.session_id) {
      return Err(TestStoreError::MissingSession(input.session_id));
    }
    let pair = QaPair {
      id:         next_id(t.qa_pairs.len()),
      session_id: input.session_id,
      question:   input.question,
      answer:     input.answer,
      timestamp:  Utc::now(),
    };
    t.qa_pairs.push(pair.clone());
    Ok(pair)
  }

  async fn get_qa_pairs(&self, session_id: SessionId) -> Result<Vec<QaPair>, TestStoreError> {
    self.read_check()?;
    Ok(
      self
        .tables()
        .qa_pairs
        .iter()
        .filter(|p| p.session_id == session_id)
        .cloned()
        .collect(),
    )
  }

  async fn save_document(
    &self,
    session_id: SessionId,
    content: String,
  ) -> Result<Document, TestStoreError> {
    self.write_check()?;
    let mut t = self.tables();
    if !t.sessions.iter().any(|s| s.id == session_id) {
      return Err(TestStoreError::MissingSession(session_id));
    }
    let doc = Document {
      id: next_id(t.documents.len()),
      session_id,
      content,
      timestamp: Utc::now(),
    };
    t.documents.push(doc.clone());
    Ok(doc)
  }

  async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, TestStoreError> {
    self.read_check()?;
    Ok(self.tables().documents.iter().find(|d| d.id == id).cloned())
  }

  async fn list_documents(
    &self,
    session_id: SessionId,
  ) -> Result<Vec<Document>, TestStoreError> {
    self.read_check()?;
    Ok(
      self
        .tables()
        .documents
        .iter()
        .filter(|d| d.session_id == session_id)
        .cloned()
        .collect(),
    )
  }
}

// ─── Completion double ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("scripted failure: {0}")]
pub struct ScriptError(pub String);

/// Replays queued replies and records every request it receives.
#[derive(Default)]
pub struct ScriptedCompletion {
  replies:  Mutex<VecDeque<Result<String, String>>>,
  requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
  pub fn reply(self, text: &str) -> Self {
    self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    self
  }

  pub fn fail(self, message: &str) -> Self {
    self.replies.lock().unwrap().push_back(Err(message.to_string()));
    self
  }

  pub fn requests(&self) -> Vec<CompletionRequest> {
    self.requests.lock().unwrap().clone()
  }
}

impl CompletionService for ScriptedCompletion {
  type Error = ScriptError;

  async fn complete(&self, request: CompletionRequest) -> Result<String, ScriptError> {
    self.requests.lock().unwrap().push(request);
    self
      .replies
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err("no scripted reply left".to_string()))
      .map_err(ScriptError)
  }
}

// ─── State double ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("state cache unavailable")]
pub struct StateUnavailable;

/// A [`SessionStateStore`] whose every call fails.
pub struct BrokenStateStore;

impl SessionStateStore for BrokenStateStore {
  type Error = StateUnavailable;

  async fn init_flags(&self, _: SessionId) -> Result<(), StateUnavailable> {
    Err(StateUnavailable)
  }

  async fn flags(&self, _: SessionId) -> Result<Option<SessionFlags>, StateUnavailable> {
    Err(StateUnavailable)
  }

  async fn set_flag(&self, _: SessionId, _: Flag) -> Result<bool, StateUnavailable> {
    Err(StateUnavailable)
  }

  async fn history(&self, _: SessionId) -> Result<Vec<Exchange>, StateUnavailable> {
    Err(StateUnavailable)
  }

  async fn append_exchange(
    &self,
    _: SessionId,
    _: Exchange,
  ) -> Result<(), StateUnavailable> {
    Err(StateUnavailable)
  }
}
