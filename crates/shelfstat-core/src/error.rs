//! Error types for `shelfstat-core`.

use thiserror::Error;

use crate::checkout::ColumnRole;

#[derive(Debug, Error)]
pub enum Error {
  #[error("top-N must be between {min} and {max}, got {got}")]
  TopNOutOfRange { got: usize, min: usize, max: usize },

  #[error("no column matches the {role} role among headers {headers:?}")]
  MissingColumn {
    role:    ColumnRole,
    headers: Vec<String>,
  },

  #[error("data source error: {0}")]
  Source(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("sink error: {0}")]
  Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
