//! Error types for `warden-core`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("unrecognized role: {0:?}")]
  UnknownRole(String),

  #[error("unrecognized todo status: {0:?}")]
  UnknownStatus(String),

  #[error("title is required")]
  MissingTitle,

  #[error("title must be at most {max} characters")]
  TitleTooLong { max: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
