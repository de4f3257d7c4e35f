use super::ApiError;
use reqwest::Client;
use serde_derive::Serialize;
use url::Url;

/// Ask the server to grant `role` to `username`.
///
/// The ack payload is server-defined, so it is handed back verbatim.
pub async fn assign_role(
    client: &Client,
    base: &Url,
    token: Option<&str>,
    username: &str,
    role: &str,
) -> Result<serde_json::Value, ApiError> {
    let data = Data { username, role };
    let response =
        super::post(client, base, "assign_role", token, &data).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }

    Ok(serde_json::from_str(&body)?)
}

#[derive(Debug, Copy, Clone, Serialize)]
struct Data<'a> {
    username: &'a str,
    role: &'a str,
}
