//! Where the remote API lives.

use std::env;
use url::Url;

/// Environment variable selecting the API base URL.
pub const API_URL_ENV: &str = "EDUADMIN_API_URL";

/// Base URL used when nothing else is configured, the usual local
/// development server.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Resolve the API base URL. An explicit value wins, then
/// `EDUADMIN_API_URL`, then the local development default.
pub fn base_url(explicit: Option<&str>) -> Result<Url, url::ParseError> {
    let raw = match explicit {
        Some(raw) => raw.to_string(),
        None => env::var(API_URL_ENV)
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
    };

    Url::parse(&raw)
}
