//! Password hashing, session tokens, and the [`Authenticated`] extractor.
//!
//! Clients present a session token either as `Authorization: Bearer <token>`
//! or in the [`SESSION_COOKIE`] cookie. Only the SHA-256 digest of a token is
//! ever stored.

use std::sync::{Arc, OnceLock};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{FromRequestParts, Request},
  http::{HeaderMap, HeaderValue, header, request::Parts},
  middleware::Next,
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use warden_core::{
  policy::PolicyEngine,
  store::Store,
  subject::SubjectContext,
  user::{Session, User},
};

use crate::{AppState, error::Error};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "warden_session";

const TOKEN_BYTES: usize = 32;

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
}

/// Check a password against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc).is_ok_and(|parsed| {
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  })
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// A fresh random session token, base64url without padding.
pub fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// The digest under which a token is stored.
pub fn hash_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

/// Where a request carried its session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
  Bearer,
  Cookie,
}

/// Pull the session token out of the request headers. A bearer token wins
/// over the cookie.
pub fn session_token(headers: &HeaderMap) -> Option<(&str, TokenSource)> {
  bearer_token(headers)
    .map(|t| (t, TokenSource::Bearer))
    .or_else(|| cookie_token(headers).map(|t| (t, TokenSource::Cookie)))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
    .map(|(_, value)| value)
}

/// `Set-Cookie` value carrying a new session token.
pub fn session_cookie(token: &str, max_age_secs: u32) -> String {
  format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie() -> String {
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

// ─── Cookie refresh ──────────────────────────────────────────────────────────

/// Slot the extractor fills with a replacement `Set-Cookie` value when it
/// slides a cookie-borne session forward.
#[derive(Clone, Default)]
struct CookieRefresh(Arc<OnceLock<String>>);

/// Middleware that re-issues the session cookie after the extractor has
/// extended its session, so the browser's `Max-Age` keeps pace with the
/// stored expiry. A handler that sets its own cookie (sign-in, sign-out)
/// wins.
pub async fn refresh_session_cookie(mut req: Request, next: Next) -> Response {
  let slot = CookieRefresh::default();
  req.extensions_mut().insert(slot.clone());

  let mut res = next.run(req).await;
  if let Some(cookie) = slot.0.get()
    && !res.headers().contains_key(header::SET_COOKIE)
    && let Ok(value) = HeaderValue::from_str(cookie)
  {
    res.headers_mut().insert(header::SET_COOKIE, value);
  }
  res
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// A request whose session token resolved to a live session and account.
///
/// The user row is re-read on every request, so a role change applies to
/// existing sessions immediately.
#[derive(Debug, Clone)]
pub struct Authenticated {
  pub user:    User,
  pub session: Session,
}

impl Authenticated {
  pub fn subject(&self) -> SubjectContext { SubjectContext::new(self.user.id, self.user.role) }

  pub fn policy(&self) -> PolicyEngine { PolicyEngine::new(self.subject()) }
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: Store + Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (token, source) = session_token(&parts.headers).ok_or(Error::Unauthorized)?;
    let token_hash = hash_token(token);

    let mut session = state
      .store
      .get_session(&token_hash)
      .await
      .map_err(Error::store)?
      .ok_or(Error::Unauthorized)?;

    let now = Utc::now();
    if session.is_expired(now) {
      state
        .store
        .delete_session(&token_hash)
        .await
        .map_err(Error::store)?;
      tracing::debug!(session_id = %session.id, "rejected expired session");
      return Err(Error::Unauthorized);
    }

    // A role that no longer parses fails here, as a store error, before any
    // policy decision is made.
    let user = state
      .store
      .get_user(session.user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::Unauthorized)?;

    if now - session.updated_at >= state.config.session_refresh() {
      if let Some(extended) = state
        .store
        .extend_session(session.id, now + state.config.session_ttl())
        .await
        .map_err(Error::store)?
      {
        session = extended;
        if source == TokenSource::Cookie
          && let Some(slot) = parts.extensions.get::<CookieRefresh>()
        {
          let _ = slot
            .0
            .set(session_cookie(token, state.config.session_ttl_secs));
        }
      }
    }

    Ok(Authenticated { user, session })
  }
}
