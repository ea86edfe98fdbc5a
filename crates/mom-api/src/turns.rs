//! Handler for `POST /turns`: one user message in, one reply out.
//!
//! Always answers `200 OK`; turn failures are reported in the body's `error`
//! field so chat front-ends can keep the conversation going.

use axum::{Json, extract::State};
use mom_core::{
  completion::CompletionService,
  orchestrator::{TurnRequest, TurnResponse},
  state::SessionStateStore,
  store::RecordStore,
};

use crate::AppState;

/// `POST /turns`: body: `{"input":"...","session_id":1,"consultant_id":1}`
pub async fn handle<S, C, K>(
  State(state): State<AppState<S, C, K>>,
  Json(request): Json<TurnRequest>,
) -> Json<TurnResponse>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  Json(state.orchestrator.handle_turn(request).await)
}
