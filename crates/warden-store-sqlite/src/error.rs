//! Error type for `warden-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A stored role or status no longer parses.
  #[error("core error: {0}")]
  Core(#[from] warden_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("an account with email {0:?} already exists")]
  EmailTaken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
