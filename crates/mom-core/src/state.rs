//! Per-session conversational state: advisory flags and chat history.
//!
//! This state is a cache, not a source of truth. [`MemoryStateStore`] keeps
//! it in process memory, so it is lost on restart; a multi-instance
//! deployment can plug in a shared backend through [`SessionStateStore`].

use std::{collections::HashMap, convert::Infallible, future::Future};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tokio::sync::RwLock;

use crate::record::SessionId;

// ─── Flags ───────────────────────────────────────────────────────────────────

/// Advisory progress markers for a session. Nothing gates on them.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct SessionFlags {
  pub essential_complete: bool,
  pub optional_complete:  bool,
  pub minutes_generated:  bool,
}

impl SessionFlags {
  pub fn set(&mut self, flag: Flag) {
    match flag {
      Flag::EssentialComplete => self.essential_complete = true,
      Flag::OptionalComplete => self.optional_complete = true,
      Flag::MinutesGenerated => self.minutes_generated = true,
    }
  }
}

/// A single settable member of [`SessionFlags`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Flag {
  EssentialComplete,
  OptionalComplete,
  MinutesGenerated,
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One completed turn of dialogue: what the user said and what came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
  pub input:  String,
  pub output: String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Storage for the state carried between turns of one session.
pub trait SessionStateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Register a session with all flags cleared.
  fn init_flags(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Current flags, or `None` for a session this store has never seen.
  fn flags(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<Option<SessionFlags>, Self::Error>> + Send + '_;

  /// Set one flag. Returns `false`, changing nothing, if the session is
  /// unknown.
  fn set_flag(
    &self,
    session_id: SessionId,
    flag: Flag,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The session's exchanges, oldest first. Unknown sessions have none.
  fn history(
    &self,
    session_id: SessionId,
  ) -> impl Future<Output = Result<Vec<Exchange>, Self::Error>> + Send + '_;

  fn append_exchange(
    &self,
    session_id: SessionId,
    exchange: Exchange,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// Process-local [`SessionStateStore`]. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
  flags:   RwLock<HashMap<SessionId, SessionFlags>>,
  history: RwLock<HashMap<SessionId, Vec<Exchange>>>,
}

impl MemoryStateStore {
  pub fn new() -> Self { Self::default() }
}

impl SessionStateStore for MemoryStateStore {
  type Error = Infallible;

  async fn init_flags(&self, session_id: SessionId) -> Result<(), Infallible> {
    self.flags.write().await.insert(session_id, SessionFlags::default());
    Ok(())
  }

  async fn flags(
    &self,
    session_id: SessionId,
  ) -> Result<Option<SessionFlags>, Infallible> {
    Ok(self.flags.read().await.get(&session_id).copied())
  }

  async fn set_flag(
    &self,
    session_id: SessionId,
    flag: Flag,
  ) -> Result<bool, Infallible> {
    Ok(match self.flags.write().await.get_mut(&session_id) {
      Some(flags) => {
        flags.set(flag);
        true
      }
      None => false,
    })
  }

  async fn history(
    &self,
    session_id: SessionId,
  ) -> Result<Vec<Exchange>, Infallible> {
    Ok(
      self
        .history
        .read()
        .await
        .get(&session_id)
        .cloned()
        .unwrap_or_default(),
    )
  }

  async fn append_exchange(
    &self,
    session_id: SessionId,
    exchange: Exchange,
  ) -> Result<(), Infallible> {
    self
      .history
      .write()
      .await
      .entry(session_id)
      .or_default()
      .push(exchange);
    Ok(())
  }
}
