//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `mom-store-sqlite`). The services in
//! this crate depend on this abstraction, never on a concrete backend, so
//! there is exactly one persistence path for every record type.

use std::future::Future;

use crate::record::{
  Consultant, ConsultantId, Document, DocumentId, NewQaPair, QaPair, Session,
  SessionId,
};

/// Durable storage for consultants, sessions, answers, and documents.
///
/// All methods return `Send` futures so the trait can be used from handlers
/// running on a multi-threaded tokio runtime.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Consultants ───────────────────────────────────────────────────────

  fn add_consultant(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Consultant, Self::Error>> + Send + '_;

  fn get_consultant(
    &self,
    id: ConsultantId,
  ) -> impl Future<Output = Result<Option<Consultant>, Self::Error>> + Send + '_;

  fn list_consultants(
    &self,
  ) -> impl Future<Output = Result<Vec<Consultant>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Create and persist a new `active` session for `consultant_id`.
  fn create_session(
    &self,
    consultant_id: ConsultantId,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Retrieve a session by id. Returns `None` if not found.
  fn get_session(
    &self,
    id: SessionId,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// List sessions, optionally restricted to one consultant.
  fn list_sessions(
    &self,
    consultant_id: Option<ConsultantId>,
  ) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  /// Mark a session `closed`. Closing an already-closed session is a no-op.
  /// Returns `false` if the session does not exist.
  fn close_session(
    &self,
    id: SessionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Answers: append-only ─────────────────────────────────────────────

  /// Persist one turn. The timestamp is assigned by the store.
  fn store_qa(
    &self,
    input: NewQaPair,
  ) -> impl Future<Output = Result<QaPair, Self::Error>> + Send + '_;

  /// All answers for a session in insertion order.
  fn get_qa_pairs(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<Vec<QaPair>, Self::Error>> + Send + '_;

  // ── Documents: append-only ───────────────────────────────────────────

  fn save_document(
    &self,
    session_id: SessionId,
    content: String,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  fn get_document(
    &self,
    id: DocumentId,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// All documents for a session, oldest first.
  fn list_documents(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + '_;
}
