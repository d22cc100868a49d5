//! Subject roles.
//!
//! The set of roles is closed. Adding one means revisiting every decision in
//! [`crate::policy`], which the exhaustive matches there enforce.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// The trust tier of an authenticated subject.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  /// Produces content; may only touch their own todos.
  #[default]
  User,
  /// Read-only oversight across all owners.
  Manager,
  /// Oversight plus the ability to delete any todo.
  Admin,
}

impl Role {
  pub const ALL: [Role; 3] = [Role::User, Role::Manager, Role::Admin];

  /// Parse the stored or submitted string form of a role.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownRole(s.to_owned()))
  }
}
