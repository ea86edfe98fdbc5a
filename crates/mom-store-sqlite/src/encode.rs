//! Conversions between domain types and the plain-text SQLite columns.
//!
//! Timestamps are RFC 3339 strings; session status is its lowercase name.

use chrono::{DateTime, Utc};
use mom_core::record::{Document, QaPair, Session, SessionStatus};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── SessionStatus ───────────────────────────────────────────────────────────

pub fn encode_status(status: SessionStatus) -> String { status.as_ref().to_string() }

pub fn decode_status(s: &str) -> Result<SessionStatus> {
  s.parse().map_err(|_| Error::UnknownStatus(s.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub id:            i64,
  pub consultant_id: i64,
  pub start_time:    String,
  pub status:        String,
}

impl RawSession {
  pub const COLUMNS: &'static str = "id, consultant_id, start_time, status";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      consultant_id: row.get(1)?,
      start_time:    row.get(2)?,
      status:        row.get(3)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      id:            self.id,
      consultant_id: self.consultant_id,
      start_time:    decode_dt(&self.start_time)?,
      status:        decode_status(&self.status)?,
    })
  }
}

/// Raw values read directly from a `mom_data` row.
pub struct RawQaPair {
  pub id:         i64,
  pub session_id: i64,
  pub question:   String,
  pub answer:     String,
  pub timestamp:  String,
}

impl RawQaPair {
  pub const COLUMNS: &'static str = "id, session_id, question, answer, timestamp";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      session_id: row.get(1)?,
      question:   row.get(2)?,
      answer:     row.get(3)?,
      timestamp:  row.get(4)?,
    })
  }

  pub fn into_qa_pair(self) -> Result<QaPair> {
    Ok(QaPair {
      id:         self.id,
      session_id: self.session_id,
      question:   self.question,
      answer:     self.answer,
      timestamp:  decode_dt(&self.timestamp)?,
    })
  }
}

/// Raw values read directly from a `mom_documents` row.
pub struct RawDocument {
  pub id:         i64,
  pub session_id: i64,
  pub content:    String,
  pub timestamp:  String,
}

impl RawDocument {
  pub const COLUMNS: &'static str = "id, session_id, content, timestamp";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      session_id: row.get(1)?,
      content:    row.get(2)?,
      timestamp:  row.get(3)?,
    })
  }

  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      id:         self.id,
      session_id: self.session_id,
      content:    self.content,
      timestamp:  decode_dt(&self.timestamp)?,
    })
  }
}
