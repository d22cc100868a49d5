//! Sign-up, sign-in, and session handlers.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{
  role::Role,
  store::Store,
  user::{NewSession, NewUser, User, normalize_email},
};

use crate::{
  AppState,
  auth::{
    Authenticated, clear_session_cookie, generate_token, hash_password, hash_token,
    session_cookie, verify_password,
  },
  error::Error,
};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
  pub email:    String,
  pub password: String,
  #[serde(default)]
  pub name:     Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInBody {
  pub email:    String,
  pub password: String,
}

/// A freshly issued session. The token is only ever shown here.
#[derive(Debug, Serialize)]
pub struct SessionGrant {
  pub user:       User,
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
  pub user:       User,
  pub expires_at: DateTime<Utc>,
}

/// Create a session for `user` and build the response carrying its token.
async fn grant<S>(state: &AppState<S>, user: User, status: StatusCode) -> Result<Response, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  let token = generate_token();
  let session = state
    .store
    .create_session(NewSession {
      user_id:    user.id,
      token_hash: hash_token(&token),
      expires_at: Utc::now() + state.config.session_ttl(),
    })
    .await
    .map_err(Error::store)?;

  let cookie = session_cookie(&token, state.config.session_ttl_secs);
  let body = SessionGrant {
    user,
    token,
    expires_at: session.expires_at,
  };
  Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn sign_up<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<SignUpBody>, JsonRejection>,
) -> Result<Response, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  if !state.config.allow_sign_up {
    return Err(Error::Forbidden("sign-up is disabled".to_owned()));
  }

  let Json(body) = body?;
  let email = normalize_email(&body.email);
  if !email.contains('@') {
    return Err(Error::BadRequest("a valid email is required".to_owned()));
  }
  if body.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  // The unique index on email still catches a concurrent sign-up.
  if state
    .store
    .get_credentials(&email)
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(Error::Conflict(format!("{email} is already registered")));
  }

  let user = state
    .store
    .create_user(NewUser {
      email:         email.clone(),
      name:          body.name.filter(|n| !n.trim().is_empty()),
      password_hash: hash_password(&body.password)?,
      role:          Role::User,
    })
    .await
    .map_err(|e| {
      if S::is_email_taken(&e) {
        Error::Conflict(format!("{email} is already registered"))
      } else {
        Error::store(e)
      }
    })?;

  tracing::info!(user_id = %user.id, email = %user.email, "registered user");
  grant(&state, user, StatusCode::CREATED).await
}

pub async fn sign_in<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<SignInBody>, JsonRejection>,
) -> Result<Response, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  let Json(body) = body?;
  let email = normalize_email(&body.email);

  let Some(creds) = state
    .store
    .get_credentials(&email)
    .await
    .map_err(Error::store)?
  else {
    tracing::debug!(%email, "sign-in for unknown email");
    return Err(Error::Unauthorized);
  };

  if !verify_password(&body.password, &creds.password_hash) {
    tracing::debug!(user_id = %creds.user.id, "sign-in with wrong password");
    return Err(Error::Unauthorized);
  }

  tracing::info!(user_id = %creds.user.id, "signed in");
  grant(&state, creds.user, StatusCode::OK).await
}

pub async fn current(auth: Authenticated) -> Json<SessionInfo> {
  Json(SessionInfo {
    user:       auth.user,
    expires_at: auth.session.expires_at,
  })
}

pub async fn sign_out<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Response, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  state
    .store
    .delete_session(&auth.session.token_hash)
    .await
    .map_err(Error::store)?;

  tracing::info!(user_id = %auth.user.id, session_id = %auth.session.id, "signed out");
  Ok(
    (
      StatusCode::NO_CONTENT,
      [(header::SET_COOKIE, clear_session_cookie())],
    )
      .into_response(),
  )
}
