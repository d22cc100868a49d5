//! Role management.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use warden_core::{
  role::Role,
  store::Store,
  user::{User, normalize_email},
};

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Deserialize)]
pub struct UpdateRoleBody {
  pub email: String,
  pub role:  String,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
  pub user: User,
}

pub async fn update_role<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
  body: Result<Json<UpdateRoleBody>, JsonRejection>,
) -> Result<Json<UserEnvelope>, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  if !auth.policy().can_manage_roles() {
    tracing::debug!(user_id = %auth.user.id, role = %auth.user.role, "role change denied");
    return Err(Error::Forbidden("only admins may change roles".to_owned()));
  }

  let Json(body) = body?;
  let role = Role::parse(&body.role)?;
  let email = normalize_email(&body.email);

  let user = state
    .store
    .set_role(&email, role)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("no account for {email}")))?;

  tracing::info!(user_id = %user.id, %role, changed_by = %auth.user.id, "changed role");
  Ok(Json(UserEnvelope { user }))
}
