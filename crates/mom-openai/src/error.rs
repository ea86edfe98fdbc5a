//! Error type for `mom-openai`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no OpenAI API key configured (set openai.api_key or OPENAI_API_KEY)")]
  MissingApiKey,

  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("OpenAI API returned {status}: {message}")]
  Status { status: u16, message: String },

  #[error("OpenAI API returned no content in the response")]
  EmptyResponse,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
