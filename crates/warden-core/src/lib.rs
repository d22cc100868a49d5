//! Core types, the access policy, and the storage trait for Warden.
//!
//! Nothing here depends on HTTP or a database.
//! Every decision about who may do what to a todo lives in [`policy`].

// `Store` spells out `Send` on its futures; implementors use `async fn`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod policy;
pub mod role;
pub mod store;
pub mod subject;
pub mod todo;
pub mod user;

pub use error::{Error, Result};
