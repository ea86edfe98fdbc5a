//! OpenAI Chat Completions backend for [`mom_core::completion::CompletionService`].
//!
//! Talks to `POST {base_url}/chat/completions` directly over HTTPS. The base
//! URL is configurable so any API-compatible server can stand in.

mod client;

pub mod error;

pub use client::{OpenAiClient, OpenAiConfig};
pub use error::{Error, Result};
