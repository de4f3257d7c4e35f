//! Session management and API bindings for the eduadmin learning
//! platform's administrative console.
//!
//! The heart of the crate is the [`SessionManager`]: it owns the current
//! authenticated identity, persists it across process runs through a
//! small key-value port, exposes the role predicates the console's
//! route guards rely on, and mediates login, registration and role
//! assignment against the platform's REST API.

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod api;
pub mod config;
pub mod endpoints;
mod manager;
mod notify;
mod session;
mod storage;

pub use api::{AuthApi, Credentials, HttpApi, RoleChange};
pub use manager::SessionManager;
pub use notify::{LogNotifier, Notice, Notifier};
pub use session::{Session, User, ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TOKEN_KEY, USER_KEY};

/// The default user agent to use when communicating with the eduadmin
/// server.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
