use tracing::debug;

use crate::error::{ApiError, reject};
use crate::types::{NewPost, Post};

/// Client for the forum service's post feed (`/api` base by default).
///
/// Reading the feed is anonymous; create and delete carry the bearer token.
/// A 401 on any authenticated call surfaces as [`ApiError::Unauthorized`] so
/// the caller can drop its persisted session.
#[derive(Debug, Clone)]
pub struct ForumClient {
    http: reqwest::Client,
    base_url: String,
}

impl ForumClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// GET `/posts` — the whole feed, newest ordering decided by the server.
    pub async fn posts(&self) -> Result<Vec<Post>, ApiError> {
        let resp = self
            .http
            .get(self.url("posts"))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        resp.json::<Vec<Post>>().await.map_err(ApiError::Http)
    }

    /// GET `/posts/:id` — a single post.
    pub async fn post(&self, id: i64) -> Result<Post, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("posts/{id}")))
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        resp.json::<Post>().await.map_err(ApiError::Http)
    }

    /// POST `/posts` with bearer auth. Validates locally first.
    pub async fn create_post(&self, token: &str, new_post: &NewPost) -> Result<Post, ApiError> {
        new_post.validate()?;
        debug!(title = %new_post.title, "creating post");
        let resp = self
            .http
            .post(self.url("posts"))
            .bearer_auth(token)
            .json(new_post)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        resp.json::<Post>().await.map_err(ApiError::Http)
    }

    /// DELETE `/posts/:id` with bearer auth.
    pub async fn delete_post(&self, token: &str, id: i64) -> Result<(), ApiError> {
        debug!(post_id = id, "deleting post");
        let resp = self
            .http
            .delete(self.url(&format!("posts/{id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        if !resp.status().is_success() {
            return Err(reject(resp).await);
        }
        Ok(())
    }
}
