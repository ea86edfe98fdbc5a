//! Persistent record types: consultants, sessions, answers, and documents.
//!
//! Records are addressed by integer surrogate keys assigned by the store.
//! Answers and documents are append-only; the only mutation anywhere is a
//! session's `active → closed` status transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub type ConsultantId = i64;
pub type SessionId = i64;
pub type QaPairId = i64;
pub type DocumentId = i64;

/// The person being interviewed about a meeting they attended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultant {
  pub id:   ConsultantId,
  pub name: String,
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
  #[default]
  Active,
  /// A minutes document has been generated for the session.
  Closed,
}

/// One interview, from the first turn until minutes are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub id:            SessionId,
  pub consultant_id: ConsultantId,
  pub start_time:    DateTime<Utc>,
  pub status:        SessionStatus,
}

// ─── Answers ─────────────────────────────────────────────────────────────────

/// A single persisted turn. Ordering by `id` is conversation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
  pub id:         QaPairId,
  pub session_id: SessionId,
  pub question:   String,
  pub answer:     String,
  /// Server-assigned; never changes after creation.
  pub timestamp:  DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::store_qa`].
#[derive(Debug, Clone)]
pub struct NewQaPair {
  pub session_id: SessionId,
  pub question:   String,
  pub answer:     String,
}

impl NewQaPair {
  pub fn new(
    session_id: SessionId,
    question: impl Into<String>,
    answer: impl Into<String>,
  ) -> Self {
    Self { session_id, question: question.into(), answer: answer.into() }
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A generated minutes document. A session may own any number of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub id:         DocumentId,
  pub session_id: SessionId,
  pub content:    String,
  pub timestamp:  DateTime<Utc>,
}
