//! Session Tracker: session creation plus the advisory progress flags.
//!
//! The flags describe a soft state machine
//! (`New → EssentialDone → OptionalDone → Done`). Transitions are reported by
//! whoever judges the conversation; nothing in this crate blocks on them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
  Error, Result,
  record::{ConsultantId, SessionId},
  state::{Flag, SessionFlags, SessionStateStore},
  store::RecordStore,
};

/// Where a session stands, derived from its [`SessionFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
  New,
  EssentialDone,
  OptionalDone,
  Done,
}

impl From<SessionFlags> for SessionPhase {
  fn from(flags: SessionFlags) -> Self {
    if flags.minutes_generated {
      Self::Done
    } else if flags.optional_complete {
      Self::OptionalDone
    } else if flags.essential_complete {
      Self::EssentialDone
    } else {
      Self::New
    }
  }
}

pub struct SessionTracker<S, K> {
  store: Arc<S>,
  state: Arc<K>,
}

impl<S, K> Clone for SessionTracker<S, K> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), state: self.state.clone() }
  }
}

impl<S, K> SessionTracker<S, K>
where
  S: RecordStore,
  K: SessionStateStore,
{
  pub fn new(store: Arc<S>, state: Arc<K>) -> Self { Self { store, state } }

  /// Create a session for `consultant_id` and register it with clear flags.
  pub async fn start(&self, consultant_id: ConsultantId) -> Result<SessionId> {
    let session = self
      .store
      .create_session(consultant_id)
      .await
      .map_err(Error::store)?;
    self.state.init_flags(session.id).await.map_err(Error::state)?;
    info!(session_id = session.id, consultant_id, "started session");
    Ok(session.id)
  }

  /// The session's flags, or `None` if this process has never seen it.
  pub async fn flags(&self, session_id: SessionId) -> Result<Option<SessionFlags>> {
    self.state.flags(session_id).await.map_err(Error::state)
  }

  pub async fn phase(&self, session_id: SessionId) -> Result<Option<SessionPhase>> {
    Ok(self.flags(session_id).await?.map(SessionPhase::from))
  }

  pub async fn mark_essential_complete(&self, session_id: SessionId) -> Result<()> {
    self.mark(session_id, Flag::EssentialComplete).await
  }

  pub async fn mark_optional_complete(&self, session_id: SessionId) -> Result<()> {
    self.mark(session_id, Flag::OptionalComplete).await
  }

  pub async fn mark_minutes_generated(&self, session_id: SessionId) -> Result<()> {
    self.mark(session_id, Flag::MinutesGenerated).await
  }

  /// Set `flag`; unknown sessions are silently ignored.
  pub async fn mark(&self, session_id: SessionId, flag: Flag) -> Result<()> {
    let known = self
      .state
      .set_flag(session_id, flag)
      .await
      .map_err(Error::state)?;
    if !known {
      debug!(session_id, %flag, "ignoring flag for untracked session");
    }
    Ok(())
  }
}
