use serde::{Deserialize, Serialize};

use crate::ApiError;

/// The identity half of a persisted session, as handed back by the auth
/// service at login and compared against post authors in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
}

/// Registration request body. The limits mirror the auth service's own
/// validation so obvious rejects never hit the wire.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().len() < 3 {
            return Err(ApiError::Invalid(
                "username must be at least 3 characters".into(),
            ));
        }
        if self.password.len() < 8 {
            return Err(ApiError::Invalid(
                "password must be at least 8 characters".into(),
            ));
        }
        if !self.email.contains('@') {
            return Err(ApiError::Invalid("email address is not valid".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful register/login response: `{access_token, user_id, username}`.
///
/// The aliases absorb the camelCase spelling the register endpoint uses for
/// the same fields. A response without a token fails to decode: the client
/// treats "200 but no token" as a failed login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSuccess {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "userId")]
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
}

/// One forum post as the forum service returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub author: String,
}

impl Post {
    /// Delete visibility gate: only the author may delete a post.
    pub fn deletable_by(&self, user: &UserProfile) -> bool {
        self.author_id == user.id
    }
}

/// Body for creating a post. Title and content limits mirror the forum
/// service's validation rules (title 3..=100, content >= 10).
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), ApiError> {
        let title_len = self.title.trim().len();
        if title_len < 3 || title_len > 100 {
            return Err(ApiError::Invalid(
                "title must be between 3 and 100 characters".into(),
            ));
        }
        if self.content.trim().len() < 10 {
            return Err(ApiError::Invalid(
                "content must be at least 10 characters".into(),
            ));
        }
        Ok(())
    }
}
