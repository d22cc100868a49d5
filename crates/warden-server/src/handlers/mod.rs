pub mod account;
pub mod todos;
pub mod users;

use uuid::Uuid;

use crate::error::Error;

/// Parse a todo id from the path. A malformed id names no todo, so it is a
/// 404 rather than a 400.
pub(super) fn parse_id(raw: &str) -> Result<Uuid, Error> {
  Uuid::parse_str(raw).map_err(|_| Error::NotFound(format!("todo {raw} not found")))
}
