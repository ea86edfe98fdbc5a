//! Core types and services for the Meeting Minutes interview assistant.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! record store, the text-completion service, and the per-session state cache
//! are all traits; concrete backends live in sibling crates.

pub mod classify;
pub mod completion;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod prompts;
pub mod record;
pub mod state;
pub mod store;
pub mod tracker;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
