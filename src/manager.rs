use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::api::{AuthApi, Credentials, RoleChange};
use crate::endpoints::ApiError;
use crate::notify::{Notice, Notifier};
use crate::session::{Session, User, ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT};
use crate::storage::{KeyValueStore, TOKEN_KEY, USER_KEY};

/// The local-only credential that keeps the console usable while no
/// backend is running. It only ever matches when the backend could not
/// be reached at all; a reachable server rejecting it is a plain failed
/// login.
const FALLBACK_USERNAME: &str = "kubi";
const FALLBACK_PASSWORD: &str = "kubi";
const FALLBACK_TOKEN_PREFIX: &str = "test-kubi-token-";

/// Owns the current authenticated identity.
///
/// A manager is constructed once at process start and handed to every
/// component that needs to know who is logged in; nothing else reads or
/// writes the session storage keys. Construction recovers any session a
/// previous run left in storage, so once the constructor returns, route
/// guards can trust its answers.
pub struct SessionManager {
    api: Box<dyn AuthApi>,
    store: Box<dyn KeyValueStore>,
    notifier: Box<dyn Notifier>,
    session: Option<Session>,
    busy: Arc<AtomicBool>,
}

impl SessionManager {
    /// Create a manager, restoring any session left in `store` by a
    /// previous run. Partial or unparsable stored state is cleared and
    /// silently treated as logged out.
    pub fn new(
        api: Box<dyn AuthApi>,
        mut store: Box<dyn KeyValueStore>,
        notifier: Box<dyn Notifier>,
    ) -> SessionManager {
        let session = restore(&mut *store);

        SessionManager {
            api,
            store,
            notifier,
            session,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The restored or freshly established session, if any.
    pub fn current(&self) -> Option<&Session> { self.session.as_ref() }

    /// The bearer token other API calls should attach, if any.
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    /// Whether a login, registration or role assignment is in flight.
    /// Advisory only, meant for disabling submit buttons.
    pub fn is_busy(&self) -> bool { self.busy.load(Ordering::Relaxed) }

    pub fn is_authenticated(&self) -> bool { self.session.is_some() }

    /// Whether the current user carries `role`. Never panics; an absent
    /// session simply has no roles.
    pub fn has_role(&self, role: &str) -> bool {
        self.session
            .as_ref()
            .map(|s| s.has_role(role))
            .unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool { self.has_role(ROLE_ADMIN) }

    /// Admins have instructor-level access as well.
    pub fn is_instructor(&self) -> bool {
        self.has_role(ROLE_INSTRUCTOR) || self.has_role(ROLE_ADMIN)
    }

    pub fn is_student(&self) -> bool { self.has_role(ROLE_STUDENT) }

    /// Authenticate against the backend and establish a session.
    ///
    /// Logging in while a session is already active simply replaces it.
    ///
    /// When no HTTP response could be obtained at all and the submitted
    /// credentials are the fallback test pair, a local admin session is
    /// synthesized instead and a distinct notice flags that no server
    /// was contacted.
    pub async fn login(
        &mut self,
        credentials: &Credentials,
    ) -> Result<Session, ApiError> {
        let _busy = BusyGuard::engage(&self.busy);

        match self.api.login(credentials).await {
            Ok(ok) => {
                let session = Session {
                    token: ok.token,
                    user: User {
                        username: ok.username,
                        roles: ok.roles,
                        awarded_badges: ok.awarded_badges,
                        created_at: Utc::now(),
                    },
                };
                self.install(&session);
                self.notifier.notify(&Notice::Welcome {
                    username: session.user.username.clone(),
                });

                Ok(session)
            },
            Err(ApiError::Unreachable { .. }) if is_fallback(credentials) => {
                log::warn!(
                    "Backend unreachable, falling back to the local test user"
                );
                let session = fallback_session();
                self.install(&session);
                self.notifier.notify(&Notice::TestLogin {
                    username: session.user.username.clone(),
                });

                Ok(session)
            },
            Err(err) => {
                self.notifier
                    .notify(&Notice::for_error(&err, "Unable to log in"));

                Err(err)
            },
        }
    }

    /// Create an account and establish a session for it.
    ///
    /// Registration never grants elevated roles: whatever the server
    /// answers, the session starts as a plain student with no badges.
    /// There is no fallback credential here.
    pub async fn register(
        &mut self,
        credentials: &Credentials,
    ) -> Result<Session, ApiError> {
        let _busy = BusyGuard::engage(&self.busy);

        match self.api.register(credentials).await {
            Ok(ok) => {
                let session = Session {
                    token: ok.token,
                    user: User {
                        username: ok.username,
                        roles: vec![ROLE_STUDENT.to_string()],
                        awarded_badges: Vec::new(),
                        created_at: Utc::now(),
                    },
                };
                self.install(&session);
                self.notifier.notify(&Notice::Registered {
                    username: session.user.username.clone(),
                });

                Ok(session)
            },
            Err(err) => {
                self.notifier.notify(&Notice::for_error(
                    &err,
                    "Unable to create the account",
                ));

                Err(err)
            },
        }
    }

    /// Ask the server to grant a role.
    ///
    /// The in-memory session is left untouched even when the target is
    /// the current user; the new role shows up on the next login.
    pub async fn assign_role(
        &mut self,
        change: &RoleChange,
    ) -> Result<serde_json::Value, ApiError> {
        let _busy = BusyGuard::engage(&self.busy);

        let token = self.session.as_ref().map(|s| s.token.clone());
        match self.api.assign_role(token.as_deref(), change).await {
            Ok(ack) => {
                self.notifier.notify(&Notice::RoleAssigned {
                    username: change.username.clone(),
                    role: change.role.clone(),
                });

                Ok(ack)
            },
            Err(err) => {
                self.handle_api_error(&err);

                Err(err)
            },
        }
    }

    /// Drop the current session, locally only. Safe to call when nobody
    /// is logged in.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("Logging out {}", session.user.username);
        }
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
        self.notifier.notify(&Notice::LoggedOut);
    }

    /// Apply the console's response-code contract to a failed API call.
    ///
    /// A rejected token invalidates the local session and announces the
    /// expiry; every other failure is surfaced as its contract notice.
    /// Components running their own requests route errors through here
    /// so the behavior stays uniform across the whole process.
    pub fn handle_api_error(&mut self, err: &ApiError) {
        match err {
            ApiError::AuthRejected { .. } => {
                self.invalidate();
                self.notifier.notify(&Notice::SessionExpired);
            },
            _ => self
                .notifier
                .notify(&Notice::for_error(err, "The request failed")),
        }
    }

    /// Clear the session without the logout notice (expired token,
    /// corrupt state).
    fn invalidate(&mut self) {
        self.session = None;
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
    }

    fn install(&mut self, session: &Session) {
        self.store.set(TOKEN_KEY, &session.token);
        match serde_json::to_string(&session.user) {
            Ok(raw) => self.store.set(USER_KEY, &raw),
            Err(err) => {
                log::error!("Unable to serialize the user record: {}", err)
            },
        }
        self.session = Some(session.clone());
    }
}

fn restore(store: &mut dyn KeyValueStore) -> Option<Session> {
    let token = store.get(TOKEN_KEY);
    let user = store.get(USER_KEY);

    match (token, user) {
        (Some(token), Some(raw)) => {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    log::info!("Restored the session for {}", user.username);
                    Some(Session { token, user })
                },
                Err(err) => {
                    log::warn!(
                        "Discarding an unreadable stored session: {}",
                        err
                    );
                    store.remove(TOKEN_KEY);
                    store.remove(USER_KEY);
                    None
                },
            }
        },
        (None, None) => None,
        // Token without user or vice versa; only a complete pair is a
        // session.
        _ => {
            log::warn!("Discarding a partial stored session");
            store.remove(TOKEN_KEY);
            store.remove(USER_KEY);
            None
        },
    }
}

fn is_fallback(credentials: &Credentials) -> bool {
    credentials.username == FALLBACK_USERNAME
        && credentials.password == FALLBACK_PASSWORD
}

/// A synthetic admin session for working without a backend. The token
/// embeds the current timestamp so two runs never share one.
fn fallback_session() -> Session {
    let now = Utc::now();

    Session {
        token: format!("{}{}", FALLBACK_TOKEN_PREFIX, now.timestamp_millis()),
        user: User {
            username: FALLBACK_USERNAME.to_string(),
            roles: vec![ROLE_ADMIN.to_string()],
            awarded_badges: Vec::new(),
            created_at: now,
        },
    }
}

/// Keeps the busy flag set for exactly as long as a request is in
/// flight, including early returns and dropped futures.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn engage(flag: &Arc<AtomicBool>) -> BusyGuard {
        flag.store(true, Ordering::Relaxed);

        BusyGuard {
            flag: Arc::clone(flag),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}
