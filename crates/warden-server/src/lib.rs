//! HTTP layer for Warden.
//!
//! Exposes an axum [`Router`] serving the todo API, session-based
//! authentication, and role management, backed by any [`Store`]. Every todo
//! operation consults [`warden_core::policy::PolicyEngine`] before touching
//! the store.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use warden_core::store::Store;

use handlers::{account, todos, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `warden.toml` and
/// `WARDEN_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub session_ttl_secs:     u32,
  pub session_refresh_secs: u32,
  pub allow_sign_up:        bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_owned(),
      port:                 3000,
      store_path:           PathBuf::from("warden.db"),
      session_ttl_secs:     7 * 24 * 60 * 60,
      session_refresh_secs: 24 * 60 * 60,
      allow_sign_up:        true,
    }
  }
}

impl ServerConfig {
  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::seconds(i64::from(self.session_ttl_secs))
  }

  pub fn session_refresh(&self) -> chrono::Duration {
    chrono::Duration::seconds(i64::from(self.session_refresh_secs))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: Store> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Warden API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: Store + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/api/auth/sign-up",       post(account::sign_up::<S>))
    .route("/api/auth/sign-in",       post(account::sign_in::<S>))
    .route("/api/auth/session",       get(account::current).delete(account::sign_out::<S>))
    .route("/api/users/update-role",  post(users::update_role::<S>))
    .route("/api/todos",              get(todos::list::<S>).post(todos::create::<S>))
    .route(
      "/api/todos/{id}",
      get(todos::get_one::<S>)
        .patch(todos::update::<S>)
        .delete(todos::remove::<S>),
    )
    .layer(middleware::from_fn(auth::refresh_session_cookie))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests;
