//! The subject context: who is acting on this request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// A verified `(subject_id, role)` pair.
///
/// Built once per request at the authentication boundary and never mutated
/// afterwards. The role is already a [`Role`], so an unrecognised role string
/// has been rejected before one of these can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectContext {
  pub subject_id: Uuid,
  pub role:       Role,
}

impl SubjectContext {
  pub fn new(subject_id: Uuid, role: Role) -> Self { Self { subject_id, role } }
}
