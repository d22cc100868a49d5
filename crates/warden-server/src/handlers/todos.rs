//! Handlers for `/api/todos` endpoints.
//!
//! | Method   | Path              | Decision     |
//! |----------|-------------------|--------------|
//! | `GET`    | `/api/todos`      | `list_scope` |
//! | `POST`   | `/api/todos`      | `can_create` |
//! | `GET`    | `/api/todos/{id}` | `can_view`   |
//! | `PATCH`  | `/api/todos/{id}` | `can_update` |
//! | `DELETE` | `/api/todos/{id}` | `can_delete` |
//!
//! Resource-bound operations load the todo first (404), ask the policy
//! engine (403), and only then look at the request body (400).

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};
use warden_core::{
  store::Store,
  todo::{NewTodo, Todo, TodoPatch, TodoStatus},
};

use crate::{AppState, auth::Authenticated, error::Error, handlers::parse_id};

#[derive(Debug, Serialize)]
pub struct TodoList {
  pub todos: Vec<Todo>,
}

#[derive(Debug, Serialize)]
pub struct TodoEnvelope {
  pub todo: Todo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTodoBody {
  pub title:       String,
  pub description: Option<String>,
  pub status:      Option<TodoStatus>,
}

impl From<CreateTodoBody> for NewTodo {
  fn from(body: CreateTodoBody) -> Self {
    NewTodo {
      title:       body.title,
      description: body.description,
      status:      body.status.unwrap_or_default(),
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTodoBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub status:      Option<TodoStatus>,
}

impl From<UpdateTodoBody> for TodoPatch {
  fn from(body: UpdateTodoBody) -> Self {
    TodoPatch {
      title:       body.title,
      description: body.description,
      status:      body.status,
    }
  }
}

/// Fetch a todo or fail with 404.
async fn load<S>(state: &AppState<S>, raw_id: &str) -> Result<Todo, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  let id = parse_id(raw_id)?;
  state
    .store
    .get_todo(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("todo {id} not found")))
}

fn deny(auth: &Authenticated, action: &str, todo: Option<&Todo>) -> Error {
  tracing::debug!(
    user_id = %auth.user.id,
    role = %auth.user.role,
    todo_id = ?todo.map(|t| t.id),
    action,
    "policy denied"
  );
  Error::Forbidden(format!("not allowed to {action} this todo"))
}

// ─── Handlers ────────────────────────────────────────────────────────────────

pub async fn list<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<TodoList>, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  let scope = auth.policy().list_scope();
  let todos = state.store.list_todos(scope).await.map_err(Error::store)?;
  tracing::debug!(user_id = %auth.user.id, ?scope, count = todos.len(), "listed todos");
  Ok(Json(TodoList { todos }))
}

pub async fn get_one<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<TodoEnvelope>, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  let todo = load(&state, &id).await?;
  if !auth.policy().can_view(&todo) {
    return Err(deny(&auth, "view", Some(&todo)));
  }
  Ok(Json(TodoEnvelope { todo }))
}

pub async fn create<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
  body: Result<Json<CreateTodoBody>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoEnvelope>), Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  if !auth.policy().can_create() {
    return Err(deny(&auth, "create", None));
  }

  let Json(body) = body?;
  let input = NewTodo::from(body).validated()?;
  let todo = state
    .store
    .insert_todo(auth.user.id, input)
    .await
    .map_err(Error::store)?;

  tracing::info!(todo_id = %todo.id, owner_id = %todo.owner_id, "created todo");
  Ok((StatusCode::CREATED, Json(TodoEnvelope { todo })))
}

pub async fn update<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  body: Result<Json<UpdateTodoBody>, JsonRejection>,
) -> Result<Json<TodoEnvelope>, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  let todo = load(&state, &id).await?;
  if !auth.policy().can_update(&todo) {
    return Err(deny(&auth, "update", Some(&todo)));
  }

  let Json(body) = body?;
  let patch = TodoPatch::from(body).validated()?;
  if patch.is_empty() {
    return Ok(Json(TodoEnvelope { todo }));
  }

  let todo = state
    .store
    .update_todo(todo.id, patch)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("todo {id} not found")))?;

  tracing::info!(todo_id = %todo.id, status = %todo.status, "updated todo");
  Ok(Json(TodoEnvelope { todo }))
}

pub async fn remove<S>(
  auth: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, Error>
where
  S: Store + Clone + Send + Sync + 'static,
{
  let todo = load(&state, &id).await?;
  if !auth.policy().can_delete(&todo) {
    return Err(deny(&auth, "delete", Some(&todo)));
  }

  // Losing a race with another delete still ends with the todo gone.
  state.store.delete_todo(todo.id).await.map_err(Error::store)?;

  tracing::info!(todo_id = %todo.id, user_id = %auth.user.id, "deleted todo");
  Ok(StatusCode::NO_CONTENT)
}
