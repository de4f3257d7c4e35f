//! User-facing notifications.
//!
//! The session manager never talks to a UI toolkit. It emits [`Notice`]
//! values through a [`Notifier`] sink and a single listener at the top
//! of the application decides how to render them (the web console
//! toasts them, the CLI prints them).

use std::fmt::{self, Display, Formatter};

use crate::endpoints::ApiError;

/// Something the operator should be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A login succeeded.
    Welcome { username: String },
    /// A login succeeded against the local fallback credential. No
    /// backend was contacted.
    TestLogin { username: String },
    /// Registration succeeded and a session was established.
    Registered { username: String },
    /// The server accepted a role assignment.
    RoleAssigned { username: String, role: String },
    /// The session was ended locally.
    LoggedOut,
    /// A request was rejected because the stored token is no longer
    /// valid; the local session has been cleared.
    SessionExpired,
    /// No HTTP response could be obtained from the backend.
    BackendUnreachable,
    /// The server refused the action (HTTP 403).
    NotAuthorized,
    /// The requested resource does not exist (HTTP 404).
    NotFound,
    /// The server reported an internal fault (HTTP 5xx).
    ServerFault,
    /// Any other rejection, carrying the server's detail message when
    /// one was provided.
    Rejected { message: String },
}

impl Notice {
    /// Translate a failed API call into the notice the response-code
    /// contract prescribes for it. `fallback` is shown where the server
    /// did not provide a detail message.
    pub fn for_error(err: &ApiError, fallback: &str) -> Notice {
        match err {
            ApiError::Unreachable { .. } => Notice::BackendUnreachable,
            ApiError::Forbidden => Notice::NotAuthorized,
            ApiError::NotFound => Notice::NotFound,
            ApiError::ServerFault { .. } => Notice::ServerFault,
            ApiError::AuthRejected { detail }
            | ApiError::Invalid { detail }
            | ApiError::Conflict { detail } => Notice::Rejected {
                message: detail
                    .clone()
                    .unwrap_or_else(|| fallback.to_string()),
            },
            _ => Notice::Rejected {
                message: fallback.to_string(),
            },
        }
    }

    /// Whether this notice reports a failure rather than a
    /// confirmation.
    pub fn is_failure(&self) -> bool {
        match self {
            Notice::Welcome { .. }
            | Notice::TestLogin { .. }
            | Notice::Registered { .. }
            | Notice::RoleAssigned { .. }
            | Notice::LoggedOut => false,
            Notice::SessionExpired
            | Notice::BackendUnreachable
            | Notice::NotAuthorized
            | Notice::NotFound
            | Notice::ServerFault
            | Notice::Rejected { .. } => true,
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Welcome { username } => {
                write!(f, "Welcome, {}!", username)
            },
            Notice::TestLogin { username } => write!(
                f,
                "Logged in as the local test user {}; the backend was not contacted",
                username
            ),
            Notice::Registered { username } => {
                write!(f, "Your account has been created, welcome {}!", username)
            },
            Notice::RoleAssigned { username, role } => {
                write!(f, "Assigned the {} role to {}", role, username)
            },
            Notice::LoggedOut => write!(f, "You have been logged out"),
            Notice::SessionExpired => {
                write!(f, "Your session has expired, please log in again")
            },
            Notice::BackendUnreachable => {
                write!(f, "Cannot reach the backend server")
            },
            Notice::NotAuthorized => {
                write!(f, "You are not authorized for this action")
            },
            Notice::NotFound => {
                write!(f, "The requested resource was not found")
            },
            Notice::ServerFault => {
                write!(f, "A server error occurred, please try again later")
            },
            Notice::Rejected { message } => f.write_str(message),
        }
    }
}

/// Receives notices as they happen.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Routes notices through the `log` facade, for embedders that have no
/// interactive surface of their own.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        if notice.is_failure() {
            log::warn!("{}", notice);
        } else {
            log::info!("{}", notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_messages_win_over_the_fallback() {
        let err = ApiError::Invalid {
            detail: Some(String::from("username must not be empty")),
        };

        let got = Notice::for_error(&err, "Unable to log in");

        assert_eq!(
            got,
            Notice::Rejected {
                message: String::from("username must not be empty")
            }
        );
    }

    #[test]
    fn contract_statuses_map_to_their_notices() {
        assert_eq!(
            Notice::for_error(
                &ApiError::Unreachable {
                    cause: String::from("connection refused")
                },
                "x"
            ),
            Notice::BackendUnreachable
        );
        assert_eq!(
            Notice::for_error(&ApiError::Forbidden, "x"),
            Notice::NotAuthorized
        );
        assert_eq!(
            Notice::for_error(&ApiError::NotFound, "x"),
            Notice::NotFound
        );
        assert_eq!(
            Notice::for_error(&ApiError::ServerFault { status: 502 }, "x"),
            Notice::ServerFault
        );
    }
}
