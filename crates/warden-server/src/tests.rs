//! End-to-end tests through the axum router against an in-memory store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;
use warden_core::{
  role::Role,
  store::Store,
  user::{NewSession, NewUser, User},
};
use warden_store_sqlite::{SqliteStore, now};

use super::*;
use crate::auth::{generate_token, hash_token};

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn make_state_with(config: ServerConfig) -> AppState<SqliteStore> {
  AppState {
    store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    config: Arc::new(config),
  }
}

async fn make_state() -> AppState<SqliteStore> { make_state_with(ServerConfig::default()).await }

/// Create an account directly in the store and open a session for it,
/// skipping the argon2 cost of the sign-up endpoint.
async fn account(state: &AppState<SqliteStore>, email: &str, role: Role) -> (User, String) {
  let user = state
    .store
    .create_user(NewUser {
      email:         email.into(),
      name:          None,
      password_hash: "$argon2id$unused".into(),
      role,
    })
    .await
    .unwrap();
  let token = generate_token();
  state
    .store
    .create_session(NewSession {
      user_id:    user.id,
      token_hash: hash_token(&token),
      expires_at: now() + Duration::days(7),
    })
    .await
    .unwrap();
  (user, token)
}

async fn send_raw(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<String>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let body = match body {
    Some(b) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(b)
    }
    None => Body::empty(),
  };
  router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap()
}

async fn send_with_cookie(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: &str,
) -> Response {
  let req = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::COOKIE, format!("{}={token}", auth::SESSION_COOKIE))
    .body(Body::empty())
    .unwrap();
  router(state.clone()).oneshot(req).await.unwrap()
}

fn always_refresh() -> ServerConfig {
  ServerConfig {
    session_refresh_secs: 0,
    ..ServerConfig::default()
  }
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  }
}

async fn send(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let resp = send_raw(state, method, uri, token, body.map(|b| b.to_string())).await;
  let status = resp.status();
  (status, json_body(resp).await)
}

/// Create a todo over HTTP and return its id.
async fn create_todo(state: &AppState<SqliteStore>, token: &str, body: Value) -> String {
  let (status, body) = send(state, "POST", "/api/todos", Some(token), Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["todo"]["id"].as_str().unwrap().to_owned()
}

fn todo_uri(id: &str) -> String { format!("/api/todos/{id}") }

// ─── Authentication ──────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_token_is_401_with_challenge() {
  let state = make_state().await;
  let resp = send_raw(&state, "GET", "/api/todos", None, None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  assert_eq!(json_body(resp).await, json!({ "error": "unauthorized" }));
}

#[tokio::test]
async fn unknown_token_is_401() {
  let state = make_state().await;
  let (status, _) = send(&state, "GET", "/api/todos", Some("not-a-session"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unauthenticated_is_checked_before_not_found() {
  let state = make_state().await;
  let uri = todo_uri(&Uuid::new_v4().to_string());
  for method in ["GET", "PATCH", "DELETE"] {
    let (status, _) = send(&state, method, &uri, None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{method}");
  }
}

#[tokio::test]
async fn expired_session_is_rejected_and_removed() {
  let state = make_state().await;
  let (user, _) = account(&state, "a@example.com", Role::User).await;

  let token = generate_token();
  state
    .store
    .create_session(NewSession {
      user_id:    user.id,
      token_hash: hash_token(&token),
      expires_at: now() - Duration::seconds(1),
    })
    .await
    .unwrap();

  let (status, _) = send(&state, "GET", "/api/auth/session", Some(&token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(
    state
      .store
      .get_session(&hash_token(&token))
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn session_cookie_authenticates() {
  let state = make_state().await;
  let (user, token) = account(&state, "a@example.com", Role::User).await;

  let resp = send_with_cookie(&state, "GET", "/api/auth/session", &token).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().get(header::SET_COOKIE).is_none());
  let body = json_body(resp).await;
  assert_eq!(body["user"]["id"], json!(user.id));
}

#[tokio::test]
async fn active_session_slides_forward() {
  let state = make_state_with(always_refresh()).await;
  let (user, _) = account(&state, "a@example.com", Role::User).await;

  let token = generate_token();
  let original = state
    .store
    .create_session(NewSession {
      user_id:    user.id,
      token_hash: hash_token(&token),
      expires_at: now() + Duration::hours(1),
    })
    .await
    .unwrap();

  let (status, _) = send(&state, "GET", "/api/auth/session", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);

  let refreshed = state
    .store
    .get_session(&hash_token(&token))
    .await
    .unwrap()
    .unwrap();
  assert!(refreshed.expires_at > original.expires_at + Duration::days(6));
}

#[tokio::test]
async fn sliding_cookie_session_reissues_cookie() {
  let state = make_state_with(always_refresh()).await;
  let (_, token) = account(&state, "a@example.com", Role::User).await;

  for uri in ["/api/auth/session", "/api/todos"] {
    let resp = send_with_cookie(&state, "GET", uri, &token).await;
    assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    let cookie = resp
      .headers()
      .get(header::SET_COOKIE)
      .unwrap_or_else(|| panic!("no Set-Cookie on {uri}"))
      .to_str()
      .unwrap();
    assert_eq!(
      cookie,
      auth::session_cookie(&token, state.config.session_ttl_secs)
    );
    assert!(cookie.contains("Max-Age=604800"));
  }
}

#[tokio::test]
async fn cookie_is_only_reissued_when_a_cookie_session_slides() {
  let state = make_state_with(always_refresh()).await;
  let (_, token) = account(&state, "a@example.com", Role::User).await;
  let resp = send_raw(&state, "GET", "/api/auth/session", Some(&token), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().get(header::SET_COOKIE).is_none());

  let state = make_state().await;
  let (_, token) = account(&state, "a@example.com", Role::User).await;
  let resp = send_with_cookie(&state, "GET", "/api/auth/session", &token).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn sign_out_clears_cookie_even_when_session_slides() {
  let state = make_state_with(always_refresh()).await;
  let (_, token) = account(&state, "a@example.com", Role::User).await;

  let resp = send_with_cookie(&state, "DELETE", "/api/auth/session", &token).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let cookies: Vec<_> = resp.headers().get_all(header::SET_COOKIE).iter().collect();
  assert_eq!(cookies.len(), 1);
  assert!(cookies[0].to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn sign_up_then_use_token() {
  let state = make_state().await;
  let resp = send_raw(
    &state,
    "POST",
    "/api/auth/sign-up",
    None,
    Some(json!({ "email": " Alice@Example.com ", "password": "hunter22", "name": "Alice" }).to_string()),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let cookie = resp
    .headers()
    .get(header::SET_COOKIE)
    .unwrap()
    .to_str()
    .unwrap()
    .to_owned();
  assert!(cookie.starts_with("warden_session="));
  assert!(cookie.contains("HttpOnly"));

  let body = json_body(resp).await;
  assert_eq!(body["user"]["email"], "alice@example.com");
  assert_eq!(body["user"]["role"], "user");
  let token = body["token"].as_str().unwrap().to_owned();

  let (status, session) = send(&state, "GET", "/api/auth/session", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(session["user"]["email"], "alice@example.com");
  assert!(session.get("token_hash").is_none());
}

#[tokio::test]
async fn sign_up_rejects_duplicates_and_bad_input() {
  let state = make_state().await;
  account(&state, "taken@example.com", Role::User).await;

  let cases = [
    (json!({ "email": "TAKEN@example.com", "password": "hunter22" }), StatusCode::CONFLICT),
    (json!({ "email": "no-at-sign", "password": "hunter22" }), StatusCode::BAD_REQUEST),
    (json!({ "email": "b@example.com", "password": "short" }), StatusCode::BAD_REQUEST),
    (json!({ "email": "b@example.com" }), StatusCode::BAD_REQUEST),
  ];
  for (body, expected) in cases {
    let (status, resp) = send(&state, "POST", "/api/auth/sign-up", None, Some(body.clone())).await;
    assert_eq!(status, expected, "{body}");
    assert!(resp["error"].is_string());
  }
}

#[tokio::test]
async fn sign_up_can_be_disabled() {
  let state = make_state_with(ServerConfig {
    allow_sign_up: false,
    ..ServerConfig::default()
  })
  .await;
  let (status, _) = send(
    &state,
    "POST",
    "/api/auth/sign-up",
    None,
    Some(json!({ "email": "a@example.com", "password": "hunter22" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sign_in_and_sign_out() {
  let state = make_state().await;
  let signup = json!({ "email": "a@example.com", "password": "hunter22" });
  let (status, _) = send(&state, "POST", "/api/auth/sign-up", None, Some(signup)).await;
  assert_eq!(status, StatusCode::CREATED);

  for bad in [
    json!({ "email": "a@example.com", "password": "wrong-password" }),
    json!({ "email": "nobody@example.com", "password": "hunter22" }),
  ] {
    let (status, _) = send(&state, "POST", "/api/auth/sign-in", None, Some(bad)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  let (status, body) = send(
    &state,
    "POST",
    "/api/auth/sign-in",
    None,
    Some(json!({ "email": "A@example.com", "password": "hunter22" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let token = body["token"].as_str().unwrap().to_owned();

  let resp = send_raw(&state, "DELETE", "/api/auth/session", Some(&token), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let cleared = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
  assert!(cleared.contains("Max-Age=0"));

  let (status, _) = send(&state, "GET", "/api/auth/session", Some(&token), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Todos ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn owner_can_update_and_delete_own_draft() {
  let state = make_state().await;
  let (alice, token) = account(&state, "a@example.com", Role::User).await;

  let (status, body) = send(
    &state,
    "POST",
    "/api/todos",
    Some(&token),
    Some(json!({ "title": "Write report", "description": "Q3" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["todo"]["status"], "draft");
  assert_eq!(body["todo"]["owner_id"], json!(alice.id));
  let id = body["todo"]["id"].as_str().unwrap().to_owned();

  let (status, body) = send(
    &state,
    "PATCH",
    &todo_uri(&id),
    Some(&token),
    Some(json!({ "title": "Write Q3 report" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["todo"]["title"], "Write Q3 report");
  assert_eq!(body["todo"]["description"], "Q3");

  let (status, body) = send(&state, "DELETE", &todo_uri(&id), Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(body, Value::Null);

  let (status, _) = send(&state, "GET", &todo_uri(&id), Some(&token), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completed_todo_can_be_updated_but_not_deleted() {
  let state = make_state().await;
  let (_, token) = account(&state, "a@example.com", Role::User).await;
  let id = create_todo(&state, &token, json!({ "title": "Ship it" })).await;

  let (status, body) = send(
    &state,
    "PATCH",
    &todo_uri(&id),
    Some(&token),
    Some(json!({ "status": "completed" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["todo"]["status"], "completed");

  let (status, _) = send(
    &state,
    "PATCH",
    &todo_uri(&id),
    Some(&token),
    Some(json!({ "title": "Shipped" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&state, "DELETE", &todo_uri(&id), Some(&token), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn in_progress_todo_cannot_be_deleted_by_owner() {
  let state = make_state().await;
  let (_, token) = account(&state, "a@example.com", Role::User).await;
  let id = create_todo(&state, &token, json!({ "title": "t", "status": "in_progress" })).await;

  let (status, _) = send(&state, "DELETE", &todo_uri(&id), Some(&token), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_sees_everything_and_changes_nothing() {
  let state = make_state().await;
  let (_, alice) = account(&state, "a@example.com", Role::User).await;
  let (_, dave) = account(&state, "d@example.com", Role::User).await;
  let (_, manager) = account(&state, "m@example.com", Role::Manager).await;

  let a1 = create_todo(&state, &alice, json!({ "title": "a1" })).await;
  create_todo(&state, &dave, json!({ "title": "d1" })).await;

  let (status, body) = send(&state, "GET", "/api/todos", Some(&manager), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["todos"].as_array().unwrap().len(), 2);

  let (status, _) = send(&state, "GET", &todo_uri(&a1), Some(&manager), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(
    &state,
    "POST",
    "/api/todos",
    Some(&manager),
    Some(json!({ "title": "mine" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &state,
    "PATCH",
    &todo_uri(&a1),
    Some(&manager),
    Some(json!({ "title": "edited" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&state, "DELETE", &todo_uri(&a1), Some(&manager), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_deletes_any_status_but_cannot_update() {
  let state = make_state().await;
  let (_, alice) = account(&state, "a@example.com", Role::User).await;
  let (_, admin) = account(&state, "c@example.com", Role::Admin).await;

  let id = create_todo(&state, &alice, json!({ "title": "x", "status": "in_progress" })).await;

  let (status, _) = send(
    &state,
    "PATCH",
    &todo_uri(&id),
    Some(&admin),
    Some(json!({ "status": "completed" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &state,
    "POST",
    "/api/todos",
    Some(&admin),
    Some(json!({ "title": "mine" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(&state, "DELETE", &todo_uri(&id), Some(&admin), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn user_cannot_touch_another_users_todo() {
  let state = make_state().await;
  let (_, alice) = account(&state, "a@example.com", Role::User).await;
  let (_, dave) = account(&state, "d@example.com", Role::User).await;

  for status_name in ["draft", "in_progress", "completed"] {
    let id = create_todo(&state, &dave, json!({ "title": "y", "status": status_name })).await;

    let (status, _) = send(&state, "GET", &todo_uri(&id), Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "view {status_name}");

    let (status, _) = send(
      &state,
      "PATCH",
      &todo_uri(&id),
      Some(&alice),
      Some(json!({ "title": "mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "update {status_name}");

    let (status, _) = send(&state, "DELETE", &todo_uri(&id), Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "delete {status_name}");
  }
}

#[tokio::test]
async fn user_lists_only_own_todos_newest_first() {
  let state = make_state().await;
  let (alice_user, alice) = account(&state, "a@example.com", Role::User).await;
  let (_, dave) = account(&state, "d@example.com", Role::User).await;

  let first = create_todo(&state, &alice, json!({ "title": "first" })).await;
  tokio::time::sleep(std::time::Duration::from_millis(2)).await;
  let second = create_todo(&state, &alice, json!({ "title": "second" })).await;
  create_todo(&state, &dave, json!({ "title": "other" })).await;

  let (status, body) = send(&state, "GET", "/api/todos", Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);
  let todos = body["todos"].as_array().unwrap();
  let ids: Vec<_> = todos.iter().map(|t| t["id"].as_str().unwrap()).collect();
  assert_eq!(ids, vec![second.as_str(), first.as_str()]);
  assert!(todos.iter().all(|t| t["owner_id"] == json!(alice_user.id)));
}

#[tokio::test]
async fn missing_todo_is_404_not_403() {
  let state = make_state().await;
  let (_, alice) = account(&state, "a@example.com", Role::User).await;
  let (_, manager) = account(&state, "m@example.com", Role::Manager).await;

  for token in [&alice, &manager] {
    for uri in [todo_uri(&Uuid::new_v4().to_string()), todo_uri("not-a-uuid")] {
      let (status, _) = send(&state, "GET", &uri, Some(token), None).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
      let (status, _) = send(&state, "PATCH", &uri, Some(token), Some(json!({ "title": "t" }))).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "PATCH {uri}");
      let (status, _) = send(&state, "DELETE", &uri, Some(token), None).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
    }
  }
}

#[tokio::test]
async fn create_validates_body() {
  let state = make_state().await;
  let (_, token) = account(&state, "a@example.com", Role::User).await;

  for body in [
    json!({}),
    json!({ "title": "   " }),
    json!({ "title": "x".repeat(256) }),
    json!({ "title": "t", "status": "archived" }),
    json!({ "title": 42 }),
  ] {
    let (status, resp) = send(&state, "POST", "/api/todos", Some(&token), Some(body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(resp["error"].is_string());
  }

  let resp = send_raw(&state, "POST", "/api/todos", Some(&token), Some("{not json".into())).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn permission_is_checked_before_body() {
  let state = make_state().await;
  let (_, alice) = account(&state, "a@example.com", Role::User).await;
  let (_, dave) = account(&state, "d@example.com", Role::User).await;
  let (_, manager) = account(&state, "m@example.com", Role::Manager).await;
  let id = create_todo(&state, &alice, json!({ "title": "t" })).await;

  let (status, _) = send(&state, "POST", "/api/todos", Some(&manager), Some(json!({}))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &state,
    "PATCH",
    &todo_uri(&id),
    Some(&dave),
    Some(json!({ "status": "nonsense" })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &state,
    "PATCH",
    &todo_uri(&id),
    Some(&alice),
    Some(json!({ "status": "nonsense" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_semantics() {
  let state = make_state().await;
  let (_, token) = account(&state, "a@example.com", Role::User).await;
  let (_, original) = send(
    &state,
    "POST",
    "/api/todos",
    Some(&token),
    Some(json!({ "title": "t", "description": "details" })),
  )
  .await;
  let id = original["todo"]["id"].as_str().unwrap().to_owned();

  let (status, unchanged) = send(&state, "PATCH", &todo_uri(&id), Some(&token), Some(json!({}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(unchanged, original);

  let (status, cleared) = send(
    &state,
    "PATCH",
    &todo_uri(&id),
    Some(&token),
    Some(json!({ "description": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(cleared["todo"]["description"], Value::Null);
  assert_eq!(cleared["todo"]["title"], "t");
  assert_eq!(cleared["todo"]["created_at"], original["todo"]["created_at"]);

  let (_, fetched) = send(&state, "GET", &todo_uri(&id), Some(&token), None).await;
  assert_eq!(fetched, cleared);
}

// ─── Roles ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_changes_role_and_it_applies_immediately() {
  let state = make_state().await;
  let (_, alice) = account(&state, "a@example.com", Role::User).await;
  let (_, dave) = account(&state, "d@example.com", Role::User).await;
  let (_, admin) = account(&state, "c@example.com", Role::Admin).await;
  create_todo(&state, &dave, json!({ "title": "d1" })).await;

  let (status, body) = send(&state, "GET", "/api/todos", Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["todos"].as_array().unwrap().is_empty());

  let (status, body) = send(
    &state,
    "POST",
    "/api/users/update-role",
    Some(&admin),
    Some(json!({ "email": "A@example.com", "role": "manager" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user"]["role"], "manager");

  let (_, body) = send(&state, "GET", "/api/todos", Some(&alice), None).await;
  assert_eq!(body["todos"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn role_changes_are_admin_only_and_validated() {
  let state = make_state().await;
  let (_, alice) = account(&state, "a@example.com", Role::User).await;
  let (_, manager) = account(&state, "m@example.com", Role::Manager).await;
  let (_, admin) = account(&state, "c@example.com", Role::Admin).await;

  let promote = json!({ "email": "a@example.com", "role": "admin" });
  for token in [&alice, &manager] {
    let (status, _) = send(
      &state,
      "POST",
      "/api/users/update-role",
      Some(token),
      Some(promote.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  let (status, _) = send(
    &state,
    "POST",
    "/api/users/update-role",
    Some(&admin),
    Some(json!({ "email": "a@example.com", "role": "superuser" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &state,
    "POST",
    "/api/users/update-role",
    Some(&admin),
    Some(json!({ "email": "nobody@example.com", "role": "admin" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
