use reqwest::StatusCode;
use serde::Deserialize;

/// Error taxonomy for calls into the auth and forum services.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service could not be reached at all (connection refused/reset).
    #[error("service is unavailable")]
    Unavailable,

    /// The service rejected the bearer token (HTTP 401). Callers are
    /// expected to drop any persisted session when they see this.
    #[error("session is not authorized")]
    Unauthorized,

    /// The service answered with a failure body (`{"error": ...}`).
    #[error("{0}")]
    Rejected(String),

    /// Request rejected client-side before anything hit the wire.
    #[error("{0}")]
    Invalid(String),

    /// Transport-level or decode failure that is none of the above.
    #[error("unexpected response from service")]
    Http(#[source] reqwest::Error),
}

/// Failure body shape shared by both services.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Unavailable
        } else {
            Self::Http(err)
        }
    }
}

/// Map a non-success response to an `ApiError`, pulling the server's own
/// message out of the `{"error": ...}` body when there is one.
pub(crate) async fn reject(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized;
    }
    match resp.json::<ErrorBody>().await {
        Ok(body) => ApiError::Rejected(body.error),
        Err(_) => ApiError::Rejected(format!("request failed with status {status}")),
    }
}
