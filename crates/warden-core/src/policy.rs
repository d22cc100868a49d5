//! The access policy for todos.
//!
//! Decisions are computed from three attributes: the subject's [`Role`], the
//! todo's owner, and the todo's [`TodoStatus`]. The full matrix:
//!
//! | Role      | View      | Create | Update    | Delete             |
//! |-----------|-----------|--------|-----------|--------------------|
//! | `user`    | own todos | yes    | own todos | own `draft` todos  |
//! | `manager` | all       | no     | no        | no                 |
//! | `admin`   | all       | no     | no        | all                |
//!
//! Admins can remove anything but edit nothing; managers only observe.
//!
//! Every function here is pure. A denial is `false`, not an error.

use uuid::Uuid;

use crate::{
  role::Role,
  subject::SubjectContext,
  todo::{Todo, TodoStatus},
};

// ─── List scope ──────────────────────────────────────────────────────────────

/// How a list query must be narrowed for the current subject.
///
/// The store turns this into a predicate; the policy never queries storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
  /// Only todos owned by this subject.
  Owner(Uuid),
  /// Every todo.
  Unrestricted,
}

impl ListScope {
  /// The owner the query is restricted to, if any.
  pub fn restrict_to_owner(&self) -> Option<Uuid> {
    match self {
      Self::Owner(id) => Some(*id),
      Self::Unrestricted => None,
    }
  }

  /// Whether `todo` falls inside this scope.
  pub fn admits(&self, todo: &Todo) -> bool {
    match self {
      Self::Owner(id) => todo.owner_id == *id,
      Self::Unrestricted => true,
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Evaluates access decisions for one subject.
///
/// Cheap to copy and safe to share between tasks; it holds nothing but the
/// subject context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEngine {
  subject: SubjectContext,
}

impl PolicyEngine {
  pub fn new(subject: SubjectContext) -> Self { Self { subject } }

  fn owns(&self, todo: &Todo) -> bool { todo.owner_id == self.subject.subject_id }

  pub fn can_view(&self, todo: &Todo) -> bool {
    match self.subject.role {
      Role::User => self.owns(todo),
      Role::Manager | Role::Admin => true,
    }
  }

  pub fn can_create(&self) -> bool {
    match self.subject.role {
      Role::User => true,
      Role::Manager | Role::Admin => false,
    }
  }

  pub fn can_update(&self, todo: &Todo) -> bool {
    match self.subject.role {
      Role::User => self.owns(todo),
      Role::Manager | Role::Admin => false,
    }
  }

  pub fn can_delete(&self, todo: &Todo) -> bool {
    match self.subject.role {
      Role::User => self.owns(todo) && todo.status == TodoStatus::Draft,
      Role::Admin => true,
      Role::Manager => false,
    }
  }

  pub fn list_scope(&self) -> ListScope {
    match self.subject.role {
      Role::User => ListScope::Owner(self.subject.subject_id),
      Role::Manager | Role::Admin => ListScope::Unrestricted,
    }
  }

  /// Whether the subject may change other accounts' roles.
  pub fn can_manage_roles(&self) -> bool {
    match self.subject.role {
      Role::Admin => true,
      Role::User | Role::Manager => false,
    }
  }
}
