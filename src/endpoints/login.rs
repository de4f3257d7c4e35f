use super::ApiError;
use reqwest::Client;
use serde_derive::{Deserialize, Serialize};
use url::Url;

/// Authenticate with the eduadmin server and get a token for the
/// session.
pub async fn login(
    client: &Client,
    base: &Url,
    username: &str,
    password: &str,
) -> Result<AuthOk, ApiError> {
    let data = Data { username, password };
    let response = super::post(client, base, "login", None, &data).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    let doc: AuthOk = serde_json::from_str(&body)?;
    log::info!("Logged in as {}", doc.username);

    Ok(doc)
}

/// The success payload shared by the login and register endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthOk {
    #[serde(default)]
    pub ok: bool,
    /// The opaque bearer token to attach to subsequent requests.
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub awarded_badges: Vec<String>,
}

#[derive(Debug, Copy, Clone, Serialize)]
struct Data<'a> {
    username: &'a str,
    password: &'a str,
}
