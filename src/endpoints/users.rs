use super::ApiError;
use reqwest::Client;
use serde_derive::Deserialize;
use url::Url;

/// Fetch every registered user, for the admin management screens.
pub async fn list_users(
    client: &Client,
    base: &Url,
    token: Option<&str>,
) -> Result<Vec<UserSummary>, ApiError> {
    let response = super::get(client, base, "admin/users", token).await?;

    let body = response.text().await?;
    log::trace!("Response: {}", body);

    Ok(serde_json::from_str(&body)?)
}

/// One row of the admin user listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserSummary {
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub awarded_badges: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_a_user_listing() {
        let src = r#"[
            {"username": "defne", "roles": ["instructor"]},
            {"username": "kerem", "roles": ["student"], "awarded_badges": ["early-bird"]}
        ]"#;

        let got: Vec<UserSummary> = serde_json::from_str(src).unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].username, "defne");
        assert!(got[0].awarded_badges.is_empty());
        assert_eq!(got[1].awarded_badges, vec![String::from("early-bird")]);
    }
}
