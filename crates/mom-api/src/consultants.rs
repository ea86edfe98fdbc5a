//! Handlers for `/consultants` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/consultants` | All consultants |
//! | `POST` | `/consultants` | Body: `{"name":"..."}`; returns 201 |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use mom_core::{
  completion::CompletionService, record::Consultant, state::SessionStateStore,
  store::RecordStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// `GET /consultants`
pub async fn list<S, C, K>(
  State(state): State<AppState<S, C, K>>,
) -> Result<Json<Vec<Consultant>>, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  let consultants = state.store.list_consultants().await.map_err(ApiError::store)?;
  Ok(Json(consultants))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /consultants`: body: `{"name":"Dana"}`
pub async fn create<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  let name = body.name.trim();
  if name.is_empty() {
    return Err(ApiError::BadRequest("consultant name must not be empty".into()));
  }
  let consultant = state
    .store
    .add_consultant(name.to_string())
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(consultant)))
}
