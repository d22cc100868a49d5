//! The `Store` trait.
//!
//! Implemented by storage backends (e.g. `warden-store-sqlite`). The server
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  policy::ListScope,
  role::Role,
  todo::{NewTodo, Todo, TodoPatch},
  user::{Credentials, NewSession, NewUser, Session, User},
};

/// Abstraction over a Warden storage backend.
///
/// The store performs no authorization of its own. Callers consult
/// [`crate::policy::PolicyEngine`] against a freshly fetched snapshot before
/// issuing any mutation.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether `err` is [`Store::create_user`] refusing an email that is
  /// already registered.
  fn is_email_taken(err: &Self::Error) -> bool;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. The email must already be normalised.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up an account and its password hash by (normalised) email.
  fn get_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  /// Change the role of the account with this email. Returns `None` if no
  /// such account exists.
  fn set_role<'a>(
    &'a self,
    email: &'a str,
    role: Role,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Find a session by the digest of its token. Expired sessions are
  /// returned as-is; the caller decides what to do with them.
  fn get_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  /// Push a session's expiry forward and stamp its `updated_at`.
  fn extend_session(
    &self,
    id: Uuid,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Returns `true` if a session was removed.
  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove every session that expired at or before `now`. Returns the
  /// number removed.
  fn purge_expired_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Todos ─────────────────────────────────────────────────────────────

  fn get_todo(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Todo>, Self::Error>> + Send + '_;

  /// List the todos admitted by `scope`, newest first.
  fn list_todos(
    &self,
    scope: ListScope,
  ) -> impl Future<Output = Result<Vec<Todo>, Self::Error>> + Send + '_;

  /// Persist a new todo owned by `owner_id`. Timestamps are set by the store.
  fn insert_todo(
    &self,
    owner_id: Uuid,
    input: NewTodo,
  ) -> impl Future<Output = Result<Todo, Self::Error>> + Send + '_;

  /// Apply `patch` and refresh `updated_at`. Returns `None` if the todo no
  /// longer exists.
  fn update_todo(
    &self,
    id: Uuid,
    patch: TodoPatch,
  ) -> impl Future<Output = Result<Option<Todo>, Self::Error>> + Send + '_;

  /// Returns `true` if a todo was removed.
  fn delete_todo(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
