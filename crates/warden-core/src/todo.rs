//! Todo items, the resource every policy decision is about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Longest accepted title, in characters.
pub const MAX_TITLE_LEN: usize = 255;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a todo is in its lifecycle.
///
/// Any value may follow any other; the only place status matters is
/// [`crate::policy::PolicyEngine::can_delete`].
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
pub enum TodoStatus {
  /// Not yet started. The only status in which an owner may delete.
  #[default]
  Draft,
  InProgress,
  Completed,
}

impl TodoStatus {
  pub const ALL: [TodoStatus; 3] =
    [TodoStatus::Draft, TodoStatus::InProgress, TodoStatus::Completed];

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// A todo as read from storage.
///
/// `owner_id` is fixed at creation; nothing in the system reassigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
  pub id:          Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub status:      TodoStatus,
  pub owner_id:    Uuid,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input for creating a todo. The owner and timestamps are supplied by the
/// store caller, never by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTodo {
  pub title:       String,
  pub description: Option<String>,
  pub status:      TodoStatus,
}

impl NewTodo {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      ..Self::default()
    }
  }

  /// Check the title and drop an empty description.
  pub fn validated(self) -> Result<Self> {
    validate_title(&self.title)?;
    Ok(Self {
      description: self.description.filter(|d| !d.is_empty()),
      ..self
    })
  }
}

/// A partial update. Absent fields keep their stored value.
///
/// Ownership never changes, so there is no owner field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoPatch {
  pub title:       Option<String>,
  /// `Some("")` clears the description.
  pub description: Option<String>,
  pub status:      Option<TodoStatus>,
}

impl TodoPatch {
  pub fn validated(self) -> Result<Self> {
    if let Some(title) = &self.title {
      validate_title(title)?;
    }
    Ok(self)
  }

  pub fn is_empty(&self) -> bool {
    self.title.is_none() && self.description.is_none() && self.status.is_none()
  }
}

fn validate_title(title: &str) -> Result<()> {
  if title.trim().is_empty() {
    return Err(Error::MissingTitle);
  }
  if title.chars().count() > MAX_TITLE_LEN {
    return Err(Error::TitleTooLong { max: MAX_TITLE_LEN });
  }
  Ok(())
}
