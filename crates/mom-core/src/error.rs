//! Error types for `mom-core`.

use thiserror::Error;

use crate::record::SessionId;

/// A boxed error from one of the pluggable collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("session not found: {0}")]
  SessionNotFound(SessionId),

  #[error("record store error: {0}")]
  Store(#[source] BoxError),

  #[error("completion service error: {0}")]
  Completion(#[source] BoxError),

  #[error("session state error: {0}")]
  State(#[source] BoxError),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn completion(
    e: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Completion(Box::new(e))
  }

  pub(crate) fn state(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::State(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
