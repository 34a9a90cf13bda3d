//! # Reef service API
//!
//! Wire types and HTTP clients for the two backend services a Reef client
//! talks to:
//!
//! - the **auth service** (`/register`, `/login`), which issues the opaque
//!   bearer token the rest of the system runs on, and
//! - the **forum service** (`/posts`), which serves the post feed and gates
//!   create/delete on that token.
//!
//! Both services are black boxes; this crate only knows their request and
//! response shapes. The real-time chat endpoint lives on the forum service
//! too, but speaks WebSocket and is handled by the `reef` binary directly.

mod auth;
mod error;
mod forum;
mod types;

pub use auth::AuthClient;
pub use error::ApiError;
pub use forum::ForumClient;
pub use types::{AuthSuccess, LoginRequest, NewPost, Post, RegisterRequest, UserProfile};
