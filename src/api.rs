//! The seam between the session manager and the network.
//!
//! The manager depends on the [`AuthApi`] trait rather than on reqwest
//! directly, so tests can substitute a scripted server. [`HttpApi`] is
//! the real thing, delegating to the functions in [`crate::endpoints`].

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::endpoints::{self, ApiError, AuthOk};
use crate::DEFAULT_USER_AGENT;

/// A username/password pair as submitted by a login or registration
/// form. Field-level validation (non-empty, length limits) is the
/// form's job, not this crate's.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A request to grant `role` to `username`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleChange {
    pub username: String,
    pub role: String,
}

/// The authentication operations the session manager depends on.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthOk, ApiError>;

    async fn register(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthOk, ApiError>;

    async fn assign_role(
        &self,
        token: Option<&str>,
        change: &RoleChange,
    ) -> Result<serde_json::Value, ApiError>;
}

/// The real client, speaking JSON over HTTP to the configured base URL.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    /// Build a client using the crate's default user agent.
    pub fn new(base: Url) -> Result<HttpApi, reqwest::Error> {
        let client = Client::builder().user_agent(DEFAULT_USER_AGENT).build()?;

        Ok(HttpApi::with_client(client, base))
    }

    /// Use an already-configured [`Client`].
    pub fn with_client(client: Client, base: Url) -> HttpApi {
        HttpApi { client, base }
    }

    pub fn client(&self) -> &Client { &self.client }

    pub fn base(&self) -> &Url { &self.base }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthOk, ApiError> {
        endpoints::login(
            &self.client,
            &self.base,
            &credentials.username,
            &credentials.password,
        )
        .await
    }

    async fn register(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthOk, ApiError> {
        endpoints::register(
            &self.client,
            &self.base,
            &credentials.username,
            &credentials.password,
        )
        .await
    }

    async fn assign_role(
        &self,
        token: Option<&str>,
        change: &RoleChange,
    ) -> Result<serde_json::Value, ApiError> {
        endpoints::assign_role(
            &self.client,
            &self.base,
            token,
            &change.username,
            &change.role,
        )
        .await
    }
}
