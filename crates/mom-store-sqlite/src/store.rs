//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::error;

use mom_core::{
  record::{
    Consultant, ConsultantId, Document, DocumentId, NewQaPair, QaPair, Session,
    SessionId, SessionStatus,
  },
  store::RecordStore,
};

use crate::{
  Result,
  encode::{RawDocument, RawQaPair, RawSession, encode_dt, encode_status},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A minutes record store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_qa(&self, input: NewQaPair) -> Result<QaPair> {
    let timestamp = Utc::now();
    let at_str = encode_dt(timestamp);
    let (session_id, question, answer) =
      (input.session_id, input.question.clone(), input.answer.clone());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO mom_data (session_id, question, answer, timestamp)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![session_id, question, answer, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(QaPair {
      id,
      session_id: input.session_id,
      question: input.question,
      answer: input.answer,
      timestamp,
    })
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Consultants ───────────────────────────────────────────────────────────

  async fn add_consultant(&self, name: String) -> Result<Consultant> {
    let name_param = name.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO consultants (name) VALUES (?1)",
          rusqlite::params![name_param],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(Consultant { id, name })
  }

  async fn get_consultant(&self, id: ConsultantId) -> Result<Option<Consultant>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT id, name FROM consultants WHERE id = ?1",
                rusqlite::params![id],
                |row| Ok(Consultant { id: row.get(0)?, name: row.get(1)? }),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn list_consultants(&self) -> Result<Vec<Consultant>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare("SELECT id, name FROM consultants ORDER BY id")?;
          let rows = stmt
            .query_map([], |row| {
              Ok(Consultant { id: row.get(0)?, name: row.get(1)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, consultant_id: ConsultantId) -> Result<Session> {
    let start_time = Utc::now();
    let at_str = encode_dt(start_time);
    let status_str = encode_status(SessionStatus::Active);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (consultant_id, start_time, status) VALUES (?1, ?2, ?3)",
          rusqlite::params![consultant_id, at_str, status_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Session { id, consultant_id, start_time, status: SessionStatus::Active })
  }

  async fn get_session(&self, id: SessionId) -> Result<Option<Session>> {
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM sessions WHERE id = ?1", RawSession::COLUMNS),
              rusqlite::params![id],
              RawSession::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn list_sessions(&self, consultant_id: Option<ConsultantId>) -> Result<Vec<Session>> {
    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM sessions
           WHERE ?1 IS NULL OR consultant_id = ?1
           ORDER BY id",
          RawSession::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![consultant_id], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn close_session(&self, id: SessionId) -> Result<bool> {
    let status_str = encode_status(SessionStatus::Closed);
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE sessions SET status = ?2 WHERE id = ?1",
          rusqlite::params![id, status_str],
        )?)
      })
      .await?;
    Ok(updated > 0)
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  async fn store_qa(&self, input: NewQaPair) -> Result<QaPair> {
    let session_id = input.session_id;
    let result = self.insert_qa(input).await;
    if let Err(e) = &result {
      error!(session_id, error = %e, "database error storing answer");
    }
    result
  }

  async fn get_qa_pairs(&self, session_id: SessionId) -> Result<Vec<QaPair>> {
    let raws: Vec<RawQaPair> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM mom_data WHERE session_id = ?1 ORDER BY id",
          RawQaPair::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![session_id], RawQaPair::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQaPair::into_qa_pair).collect()
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn save_document(&self, session_id: SessionId, content: String) -> Result<Document> {
    let timestamp = Utc::now();
    let at_str = encode_dt(timestamp);
    let content_param = content.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO mom_documents (session_id, content, timestamp) VALUES (?1, ?2, ?3)",
          rusqlite::params![session_id, content_param, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Document { id, session_id, content, timestamp })
  }

  async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM mom_documents WHERE id = ?1", RawDocument::COLUMNS),
              rusqlite::params![id],
              RawDocument::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn list_documents(&self, session_id: SessionId) -> Result<Vec<Document>> {
    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM mom_documents WHERE session_id = ?1 ORDER BY id",
          RawDocument::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![session_id], RawDocument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }
}
