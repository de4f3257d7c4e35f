use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// The role every freshly registered account starts with.
pub const ROLE_STUDENT: &str = "student";
/// The role allowed to manage lessons and question sets.
pub const ROLE_INSTRUCTOR: &str = "instructor";
/// The role allowed to manage users and roles. Implies instructor-level
/// access everywhere the console checks for it.
pub const ROLE_ADMIN: &str = "admin";

/// An authenticated session: the bearer token plus the user record it
/// belongs to. One exists exactly when both halves could be produced,
/// either by the server or by durable storage.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn has_role(&self, role: &str) -> bool { self.user.has_role(role) }
}

/// The durable user record, exactly what is persisted under the `user`
/// storage key. The bearer token lives under its own key and is never
/// serialized with the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct User {
    pub username: String,
    /// Role names as the server sent them. Unknown roles are carried
    /// along untouched rather than rejected.
    pub roles: Vec<String>,
    #[serde(default)]
    pub awarded_badges: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
