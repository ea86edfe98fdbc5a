//! JSON REST API for the minutes assistant.
//!
//! Exposes an axum [`Router`] over the core services, backed by any
//! [`RecordStore`], [`CompletionService`], and [`SessionStateStore`].
//! Auth and TLS are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", mom_api::api_router(state))
//! ```

pub mod consultants;
pub mod error;
pub mod minutes;
pub mod sessions;
pub mod turns;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use mom_core::{
  completion::CompletionService,
  generator::{DocumentGenerator, GenerationSettings},
  orchestrator::{Orchestrator, TurnSettings},
  state::SessionStateStore,
  store::RecordStore,
  tracker::SessionTracker,
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, C, K> {
  pub store:        Arc<S>,
  pub orchestrator: Arc<Orchestrator<S, C, K>>,
  pub generator:    Arc<DocumentGenerator<S, C, K>>,
}

impl<S, C, K> Clone for AppState<S, C, K> {
  fn clone(&self) -> Self {
    Self {
      store:        self.store.clone(),
      orchestrator: self.orchestrator.clone(),
      generator:    self.generator.clone(),
    }
  }
}

impl<S, C, K> AppState<S, C, K>
where
  S: RecordStore,
  C: CompletionService,
  K: SessionStateStore,
{
  /// Wire the orchestrator and generator onto shared collaborators.
  pub fn new(
    store: Arc<S>,
    completion: Arc<C>,
    state: Arc<K>,
    turns: TurnSettings,
    minutes: GenerationSettings,
  ) -> Self {
    Self {
      orchestrator: Arc::new(Orchestrator::new(
        store.clone(),
        completion.clone(),
        state.clone(),
        turns,
      )),
      generator: Arc::new(DocumentGenerator::new(
        store.clone(),
        completion,
        state,
        minutes,
      )),
      store,
    }
  }

  pub fn tracker(&self) -> &SessionTracker<S, K> { self.orchestrator.tracker() }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C, K>(state: AppState<S, C, K>) -> Router<()>
where
  S: RecordStore + 'static,
  C: CompletionService + 'static,
  K: SessionStateStore + 'static,
{
  Router::new()
    // Consultants
    .route(
      "/consultants",
      get(consultants::list::<S, C, K>).post(consultants::create::<S, C, K>),
    )
    // Sessions
    .route(
      "/sessions",
      get(sessions::list::<S, C, K>).post(sessions::create::<S, C, K>),
    )
    .route("/sessions/{id}", get(sessions::get_one::<S, C, K>))
    .route("/sessions/{id}/flags", post(sessions::mark_flag::<S, C, K>))
    .route("/sessions/{id}/answers", get(sessions::answers::<S, C, K>))
    .route("/sessions/{id}/record", get(sessions::record::<S, C, K>))
    // Conversation
    .route("/turns", post(turns::handle::<S, C, K>))
    // Minutes
    .route(
      "/sessions/{id}/minutes",
      get(minutes::list::<S, C, K>).post(minutes::generate::<S, C, K>),
    )
    .route("/minutes/{id}", get(minutes::get_one::<S, C, K>))
    .route("/minutes/{id}/download", get(minutes::download::<S, C, K>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
