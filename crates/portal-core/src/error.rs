//! Error types for `portal-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("fetch failed: {0}")]
  Fetch(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("{path} returned HTTP {status}")]
  Http { status: u16, path: String },

  #[error("invalid date: {0:?}")]
  InvalidDate(String),

  #[error("decode error: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
