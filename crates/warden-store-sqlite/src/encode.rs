//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with exactly six fractional
//! digits and a `Z` suffix. Values are truncated to microseconds when they
//! are created (see [`now`]), so a timestamp survives a write/read cycle
//! unchanged. UUIDs are stored as hyphenated lowercase strings; roles and
//! statuses as their snake_case names.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use warden_core::{
  role::Role,
  todo::{Todo, TodoStatus},
  user::{Session, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role / TodoStatus ────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str {
  match role {
    Role::User => "user",
    Role::Manager => "manager",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> { Ok(Role::parse(s)?) }

pub fn encode_status(status: TodoStatus) -> &'static str {
  match status {
    TodoStatus::Draft => "draft",
    TodoStatus::InProgress => "in_progress",
    TodoStatus::Completed => "completed",
  }
}

pub fn decode_status(s: &str) -> Result<TodoStatus> { Ok(TodoStatus::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const TODO_COLUMNS: &str =
  "todo_id, title, description, status, owner_id, created_at, updated_at";

/// Raw strings read directly from a `todos` row.
pub struct RawTodo {
  pub todo_id:     String,
  pub title:       String,
  pub description: Option<String>,
  pub status:      String,
  pub owner_id:    String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawTodo {
  /// Read a row selected with [`TODO_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      todo_id:     row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      status:      row.get(3)?,
      owner_id:    row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_todo(self) -> Result<Todo> {
    Ok(Todo {
      id:          decode_uuid(&self.todo_id)?,
      title:       self.title,
      description: self.description,
      status:      decode_status(&self.status)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

pub const USER_COLUMNS: &str =
  "user_id, email, name, role, created_at, updated_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub name:       Option<String>,
  pub role:       String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawUser {
  /// Read a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      email:      row.get(1)?,
      name:       row.get(2)?,
      role:       row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         decode_uuid(&self.user_id)?,
      email:      self.email,
      name:       self.name,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const SESSION_COLUMNS: &str =
  "session_id, user_id, token_hash, expires_at, created_at, updated_at";

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub session_id: String,
  pub user_id:    String,
  pub token_hash: String,
  pub expires_at: String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawSession {
  /// Read a row selected with [`SESSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id: row.get(0)?,
      user_id:    row.get(1)?,
      token_hash: row.get(2)?,
      expires_at: row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      id:         decode_uuid(&self.session_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      token_hash: self.token_hash,
      expires_at: decode_dt(&self.expires_at)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
