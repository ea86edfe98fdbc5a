//! Handlers for minutes documents.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sessions/:id/minutes` | Generate and persist; 201, 404, or 502 |
//! | `GET`  | `/sessions/:id/minutes` | Documents for the session, oldest first |
//! | `GET`  | `/minutes/:id` | One document |
//! | `GET`  | `/minutes/:id/download` | Plain-text attachment |

use axum::{
  Json,
  extract::{Path, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use mom_core::{
  completion::CompletionService,
  record::{Document, DocumentId, SessionId},
  state::SessionStateStore,
  store::RecordStore,
};

use crate::{AppState, error::ApiError};

const DOWNLOAD_NAME: &str = "Meeting_Minutes.txt";

/// `POST /sessions/:id/minutes`: returns 201 + `{document_id, content}`.
pub async fn generate<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Path(id): Path<SessionId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  let minutes = state.generator.generate(id).await?;
  Ok((StatusCode::CREATED, Json(minutes)))
}

/// `GET /sessions/:id/minutes`
pub async fn list<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Path(id): Path<SessionId>,
) -> Result<Json<Vec<Document>>, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  let docs = state.store.list_documents(id).await.map_err(ApiError::store)?;
  Ok(Json(docs))
}

async fn require_document<S>(store: &S, id: DocumentId) -> Result<Document, ApiError>
where
  S: RecordStore,
{
  store
    .get_document(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("document {id} not found")))
}

/// `GET /minutes/:id`
pub async fn get_one<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Path(id): Path<DocumentId>,
) -> Result<Json<Document>, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  Ok(Json(require_document(state.store.as_ref(), id).await?))
}

/// `GET /minutes/:id/download`
pub async fn download<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Path(id): Path<DocumentId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  let doc = require_document(state.store.as_ref(), id).await?;
  Ok((
    [
      (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
      ),
    ],
    doc.content,
  ))
}
