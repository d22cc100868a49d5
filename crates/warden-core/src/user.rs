//! Accounts and sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// A registered account. The password hash is never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         Uuid,
  pub email:      String,
  pub name:       Option<String>,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input for [`crate::store::Store::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub name:          Option<String>,
  /// Argon2 PHC string.
  pub password_hash: String,
  pub role:          Role,
}

/// A user together with their stored password hash, for sign-in only.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}

/// A server-side session. Only a digest of the bearer token is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub id:         Uuid,
  pub user_id:    Uuid,
  #[serde(skip)]
  pub token_hash: String,
  pub expires_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
  /// Last time the expiry was pushed forward.
  pub updated_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }
}

/// Input for [`crate::store::Store::create_session`].
#[derive(Debug, Clone)]
pub struct NewSession {
  pub user_id:    Uuid,
  pub token_hash: String,
  pub expires_at: DateTime<Utc>,
}

/// Normalise an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
