//! Handlers for `/sessions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sessions` | Optional `?consultant_id=<id>` |
//! | `POST` | `/sessions` | Body: `{"consultant_id":1}`; returns 201 |
//! | `GET`  | `/sessions/:id` | Session plus advisory flags; 404 if not found |
//! | `POST` | `/sessions/:id/flags` | Body: `{"flag":"essential_complete"}`; 204 |
//! | `GET`  | `/sessions/:id/answers` | Raw persisted turns |
//! | `GET`  | `/sessions/:id/record` | Classified answers, in field order |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mom_core::{
  classify::Classified,
  completion::CompletionService,
  record::{ConsultantId, QaPair, Session, SessionId},
  state::{Flag, SessionFlags, SessionStateStore},
  store::RecordStore,
  tracker::SessionPhase,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

async fn require_session<S, C, K>(
  state: &AppState<S, C, K>,
  id: SessionId,
) -> Result<Session, ApiError>
where
  S: RecordStore,
{
  state
    .store
    .get_session(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub consultant_id: Option<ConsultantId>,
}

/// `GET /sessions[?consultant_id=<id>]`
pub async fn list<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Session>>, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  let sessions = state
    .store
    .list_sessions(params.consultant_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(sessions))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub consultant_id: ConsultantId,
}

/// `POST /sessions`: starts a session through the tracker so its flags are
/// registered.
pub async fn create<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  if state
    .store
    .get_consultant(body.consultant_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::BadRequest(format!(
      "consultant {} does not exist",
      body.consultant_id
    )));
  }
  let id = state.tracker().start(body.consultant_id).await?;
  let session = require_session(&state, id).await?;
  Ok((StatusCode::CREATED, Json(session)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// A session together with its in-process progress flags.
#[derive(Debug, Serialize)]
pub struct SessionView {
  #[serde(flatten)]
  pub session: Session,
  /// `None` when this process has no state for the session (e.g. after a
  /// restart).
  pub flags:   Option<SessionFlags>,
  pub phase:   Option<SessionPhase>,
}

/// `GET /sessions/:id`
pub async fn get_one<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Path(id): Path<SessionId>,
) -> Result<Json<SessionView>, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  let session = require_session(&state, id).await?;
  let flags = state.tracker().flags(id).await?;
  Ok(Json(SessionView { session, flags, phase: flags.map(SessionPhase::from) }))
}

// ─── Flags ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FlagBody {
  pub flag: Flag,
}

/// `POST /sessions/:id/flags`: unknown sessions are accepted and ignored.
pub async fn mark_flag<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Path(id): Path<SessionId>,
  Json(body): Json<FlagBody>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  let tracker = state.tracker();
  match body.flag {
    Flag::EssentialComplete => tracker.mark_essential_complete(id).await?,
    Flag::OptionalComplete => tracker.mark_optional_complete(id).await?,
    Flag::MinutesGenerated => {
      return Err(ApiError::BadRequest(
        "minutes_generated is set by generating minutes".into(),
      ));
    }
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Answers ──────────────────────────────────────────────────────────────────

/// `GET /sessions/:id/answers`
pub async fn answers<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Path(id): Path<SessionId>,
) -> Result<Json<Vec<QaPair>>, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  require_session(&state, id).await?;
  let pairs = state.store.get_qa_pairs(id).await.map_err(ApiError::store)?;
  Ok(Json(pairs))
}

/// `GET /sessions/:id/record`
pub async fn record<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Path(id): Path<SessionId>,
) -> Result<Json<Vec<Classified>>, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  require_session(&state, id).await?;
  let record = state.generator.record(id).await?;
  Ok(Json(
    record
      .iter()
      .map(|(field, value)| Classified { field: field.into(), value: value.into() })
      .collect(),
  ))
}
