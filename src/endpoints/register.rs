use super::{ApiError, AuthOk};
use reqwest::Client;
use serde_derive::Serialize;
use url::Url;

/// Create a new account on the eduadmin server.
///
/// The server answers with the same payload as a login. Whatever roles
/// it claims, the console forces freshly registered accounts down to
/// `student` before establishing the session.
pub async fn register(
    client: &Client,
    base: &Url,
    username: &str,
    password: &str,
) -> Result<AuthOk, ApiError> {
    let data = Data { username, password };
    let response = super::post(client, base, "register", None, &data).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    let doc: AuthOk = serde_json::from_str(&body)?;
    log::info!("Registered the account {}", doc.username);

    Ok(doc)
}

#[derive(Debug, Copy, Clone, Serialize)]
struct Data<'a> {
    username: &'a str,
    password: &'a str,
}
