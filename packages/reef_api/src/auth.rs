use tracing::debug;

use crate::error::{ApiError, reject};
use crate::types::{AuthSuccess, LoginRequest, RegisterRequest};

/// Client for the auth service (`/api/v1` base by default).
///
/// Registration and login are the only calls; everything downstream of them
/// runs on the bearer token they return.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Create an account. Validates locally first, then POSTs `/register`.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthSuccess, ApiError> {
        req.validate()?;
        debug!(username = %req.username, "registering user");
        let resp = self
            .http
            .post(self.url("register"))
            .json(req)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        resp.json::<AuthSuccess>().await.map_err(ApiError::Http)
    }

    /// Exchange username/password for a bearer token via POST `/login`.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthSuccess, ApiError> {
        debug!(username = %req.username, "logging in");
        let resp = self
            .http
            .post(self.url("login"))
            .json(req)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        resp.json::<AuthSuccess>().await.map_err(ApiError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = AuthClient::new("http://localhost:8080/api/v1/");
        assert_eq!(client.url("login"), "http://localhost:8080/api/v1/login");
    }

    #[tokio::test]
    async fn test_register_rejects_locally_before_any_request() {
        // Points at nothing; local validation must fail first.
        let client = AuthClient::new("http://127.0.0.1:1");
        let req = RegisterRequest {
            username: "ab".into(),
            password: "longenough".into(),
            email: "a@b.c".into(),
        };
        match client.register(&req).await {
            Err(ApiError::Invalid(msg)) => assert!(msg.contains("username")),
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }
}
