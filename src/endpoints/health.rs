use super::ApiError;
use reqwest::Client;
use serde_derive::Deserialize;
use url::Url;

/// Probe the server's health endpoint. Needs no token.
pub async fn health(client: &Client, base: &Url) -> Result<Health, ApiError> {
    let response = super::get(client, base, "health", None).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    Ok(serde_json::from_str(&body)?)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub status: String,
}
