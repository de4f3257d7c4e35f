//! The eduadmin API's endpoints.

mod assign_role;
mod health;
mod login;
mod register;
mod users;

pub use assign_role::assign_role;
pub use health::{health, Health};
pub use login::{login, AuthOk};
pub use register::register;
pub use users::{list_users, UserSummary};

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_derive::Deserialize;
use std::fmt::Debug;
use url::Url;

/// Errors shared by every endpoint, classified the way the whole
/// console treats response codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No HTTP response was obtained at all; the backend is down or
    /// unreachable from this machine.
    #[error("Unable to reach the backend: {cause}")]
    Unreachable { cause: String },
    /// HTTP 401; the submitted credentials or the stored token were
    /// rejected.
    #[error("{}", .detail.as_deref().unwrap_or("Authentication was rejected by the server"))]
    AuthRejected { detail: Option<String> },
    /// HTTP 403.
    #[error("Not authorized for this action")]
    Forbidden,
    /// HTTP 404.
    #[error("The requested resource was not found")]
    NotFound,
    /// HTTP 400.
    #[error("{}", .detail.as_deref().unwrap_or("The server rejected the request as invalid"))]
    Invalid { detail: Option<String> },
    /// HTTP 409, e.g. registering a username that is already taken.
    #[error("{}", .detail.as_deref().unwrap_or("The request conflicts with existing data"))]
    Conflict { detail: Option<String> },
    /// Any HTTP 5xx.
    #[error("The server reported an internal error (HTTP {status})")]
    ServerFault { status: u16 },
    /// A non-success status the contract does not name.
    #[error("Unexpected response status {status}")]
    Unexpected { status: u16 },
    /// The response body could not be read.
    #[error("Unable to read the response")]
    HttpClient(#[from] reqwest::Error),
    /// The response body could not be parsed.
    #[error("Unable to parse the response")]
    ResponseParse(#[from] serde_json::Error),
    /// The endpoint path and base URL do not combine into a valid URL.
    #[error("Invalid endpoint URL")]
    BadUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The server-provided detail message, when the response carried
    /// one. Callers use this to attach errors to a specific form field.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::AuthRejected { detail }
            | ApiError::Invalid { detail }
            | ApiError::Conflict { detail } => detail.as_deref(),
            _ => None,
        }
    }
}

/// The error body shape the server uses for rejections.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

pub(crate) async fn post<D>(
    client: &Client,
    base: &Url,
    path: &str,
    token: Option<&str>,
    data: &D,
) -> Result<Response, ApiError>
where
    D: Debug + Serialize,
{
    let url = base.join(path)?;

    log::debug!("Sending a request to {}", url);
    log::trace!("Payload: {:#?}", data);

    let mut request = client.post(url.as_str()).json(data);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(unreachable_error)?;
    log::trace!("Headers: {:#?}", response.headers());

    check(response).await
}

pub(crate) async fn get(
    client: &Client,
    base: &Url,
    path: &str,
    token: Option<&str>,
) -> Result<Response, ApiError> {
    let url = base.join(path)?;

    log::debug!("Sending a request to {}", url);

    let mut request = client.get(url.as_str());
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(unreachable_error)?;
    log::trace!("Headers: {:#?}", response.headers());

    check(response).await
}

/// Errors surfaced by `send()` never carry an HTTP status; the request
/// produced no response at all.
fn unreachable_error(err: reqwest::Error) -> ApiError {
    log::warn!("Request failed without a response: {}", err);
    ApiError::Unreachable {
        cause: err.to_string(),
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::trace!("Error response body: {}", body);

    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.detail);

    Err(classify(status, detail))
}

fn classify(status: StatusCode, detail: Option<String>) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthRejected { detail },
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::BAD_REQUEST => ApiError::Invalid { detail },
        StatusCode::CONFLICT => ApiError::Conflict { detail },
        s if s.is_server_error() => ApiError::ServerFault {
            status: s.as_u16(),
        },
        s => ApiError::Unexpected {
            status: s.as_u16(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_the_response_code_contract() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, None),
            ApiError::AuthRejected { detail: None }
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, None),
            ApiError::Forbidden
        ));
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, None),
            ApiError::NotFound
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, Some(String::from("bad"))),
            ApiError::Invalid { detail: Some(_) }
        ));
        assert!(matches!(
            classify(StatusCode::CONFLICT, None),
            ApiError::Conflict { detail: None }
        ));
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, None),
            ApiError::ServerFault { status: 502 }
        ));
        assert!(matches!(
            classify(StatusCode::IM_A_TEAPOT, None),
            ApiError::Unexpected { status: 418 }
        ));
    }

    #[test]
    fn parse_a_rejection_body() {
        let src = r#"{"detail": "Incorrect username or password"}"#;

        let got: ErrorBody = serde_json::from_str(src).unwrap();

        assert_eq!(
            got.detail.as_deref(),
            Some("Incorrect username or password")
        );
    }

    #[test]
    fn rejection_messages_prefer_the_server_detail() {
        let err = ApiError::Invalid {
            detail: Some(String::from("role must be one of the known roles")),
        };
        assert_eq!(err.to_string(), "role must be one of the known roles");

        let err = ApiError::Invalid { detail: None };
        assert_eq!(
            err.to_string(),
            "The server rejected the request as invalid"
        );
    }

    #[test]
    fn only_rejections_carry_a_detail() {
        let err = ApiError::Conflict {
            detail: Some(String::from("username already taken")),
        };
        assert_eq!(err.detail(), Some("username already taken"));

        assert_eq!(ApiError::Forbidden.detail(), None);
        assert_eq!(ApiError::ServerFault { status: 500 }.detail(), None);
    }
}
