//! [`SqliteStore`], the SQLite implementation of [`Store`].

use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use warden_core::{
  policy::ListScope,
  role::Role,
  store::Store,
  todo::{NewTodo, Todo, TodoPatch},
  user::{Credentials, NewSession, NewUser, Session, User},
};

use crate::{
  Error, Result,
  encode::{
    RawSession, RawTodo, RawUser, SESSION_COLUMNS, TODO_COLUMNS, USER_COLUMNS,
    encode_dt, encode_role, encode_status, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Warden store backed by a single SQLite file.
///
/// Clones share one underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store. Nothing is written to disk.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Map a UNIQUE violation on `users.email` to [`Error::EmailTaken`].
fn email_conflict(e: tokio_rusqlite::Error, email: &str) -> Error {
  match e {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Error::EmailTaken(email.to_owned())
    }
    other => Error::Database(other),
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;

  fn is_email_taken(err: &Error) -> bool { matches!(err, Error::EmailTaken(_)) }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let at = now();
    let user = User {
      id:         Uuid::new_v4(),
      email:      input.email,
      name:       input.name,
      role:       input.role,
      created_at: at,
      updated_at: at,
    };

    let id_str   = encode_uuid(user.id);
    let email    = user.email.clone();
    let name     = user.name.clone();
    let hash     = input.password_hash;
    let role_str = encode_role(user.role);
    let at_str   = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, name, password_hash, role, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, email, name, hash, role_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| email_conflict(e, &user.email))?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_credentials<'a>(&'a self, email: &'a str) -> Result<Option<Credentials>> {
    let email = email.to_owned();

    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"),
              rusqlite::params![email],
              |row| Ok((RawUser::from_row(row)?, row.get(6)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(user, password_hash)| {
        Ok(Credentials {
          user: user.into_user()?,
          password_hash,
        })
      })
      .transpose()
  }

  async fn set_role<'a>(&'a self, email: &'a str, role: Role) -> Result<Option<User>> {
    let email    = email.to_owned();
    let role_str = encode_role(role);
    let at_str   = encode_dt(now());

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE users SET role = ?2, updated_at = ?3 WHERE email = ?1
                 RETURNING {USER_COLUMNS}"
              ),
              rusqlite::params![email, role_str, at_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, input: NewSession) -> Result<Session> {
    let at = now();
    let session = Session {
      id:         Uuid::new_v4(),
      user_id:    input.user_id,
      token_hash: input.token_hash,
      expires_at: input.expires_at.trunc_subsecs(6),
      created_at: at,
      updated_at: at,
    };

    let id_str      = encode_uuid(session.id);
    let user_id_str = encode_uuid(session.user_id);
    let hash        = session.token_hash.clone();
    let expires_str = encode_dt(session.expires_at);
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (session_id, token_hash, user_id, expires_at, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, hash, user_id_str, expires_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session<'a>(&'a self, token_hash: &'a str) -> Result<Option<Session>> {
    let hash = token_hash.to_owned();

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE token_hash = ?1"),
              rusqlite::params![hash],
              RawSession::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn extend_session(
    &self,
    id:         Uuid,
    expires_at: DateTime<Utc>,
  ) -> Result<Option<Session>> {
    let id_str      = encode_uuid(id);
    let expires_str = encode_dt(expires_at);
    let at_str      = encode_dt(now());

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE sessions SET expires_at = ?2, updated_at = ?3 WHERE session_id = ?1
                 RETURNING {SESSION_COLUMNS}"
              ),
              rusqlite::params![id_str, expires_str, at_str],
              RawSession::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_session<'a>(&'a self, token_hash: &'a str) -> Result<bool> {
    let hash = token_hash.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![hash],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
    let now_str = encode_dt(now);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;

    Ok(removed)
  }

  // ── Todos ─────────────────────────────────────────────────────────────────

  async fn get_todo(&self, id: Uuid) -> Result<Option<Todo>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTodo> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TODO_COLUMNS} FROM todos WHERE todo_id = ?1"),
              rusqlite::params![id_str],
              RawTodo::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTodo::into_todo).transpose()
  }

  async fn list_todos(&self, scope: ListScope) -> Result<Vec<Todo>> {
    let owner_str = scope.restrict_to_owner().map(encode_uuid);

    let raws: Vec<RawTodo> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(owner) = owner_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE owner_id = ?1
             ORDER BY created_at DESC, todo_id"
          ))?;
          stmt
            .query_map(rusqlite::params![owner], RawTodo::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, todo_id"
          ))?;
          stmt
            .query_map([], RawTodo::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTodo::into_todo).collect()
  }

  async fn insert_todo(&self, owner_id: Uuid, input: NewTodo) -> Result<Todo> {
    let at = now();
    let todo = Todo {
      id: Uuid::new_v4(),
      title: input.title,
      description: input.description,
      status: input.status,
      owner_id,
      created_at: at,
      updated_at: at,
    };

    let id_str     = encode_uuid(todo.id);
    let title      = todo.title.clone();
    let desc       = todo.description.clone();
    let status_str = encode_status(todo.status);
    let owner_str  = encode_uuid(owner_id);
    let at_str     = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO todos (todo_id, title, description, status, owner_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, title, desc, status_str, owner_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(todo)
  }

  async fn update_todo(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>> {
    let id_str     = encode_uuid(id);
    let status_str = patch.status.map(encode_status);
    let at_str     = encode_dt(now());
    let TodoPatch { title, description, .. } = patch;

    // A single statement, so the patch applies atomically. `owner_id` is
    // absent from the SET list.
    let raw: Option<RawTodo> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE todos SET
                   title       = COALESCE(?2, title),
                   description = CASE WHEN ?3 IS NULL THEN description ELSE NULLIF(?3, '') END,
                   status      = COALESCE(?4, status),
                   updated_at  = ?5
                 WHERE todo_id = ?1
                 RETURNING {TODO_COLUMNS}"
              ),
              rusqlite::params![id_str, title, description, status_str, at_str],
              RawTodo::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTodo::into_todo).transpose()
  }

  async fn delete_todo(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM todos WHERE todo_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}
