pub mod account;
pub mod chat;
pub mod posts;

use anyhow::Result;
use tracing::warn;

use reef_api::ApiError;

use crate::session_store::{Session, SessionStore};

/// Load the persisted session for a command that needs one.
fn require_session(store: &SessionStore) -> Result<Session> {
    store
        .load()
        .ok_or_else(|| anyhow::anyhow!("not logged in -- run `reef login` first"))
}

/// Translate an API failure for the user. A 401 means the stored token is
/// dead: drop the persisted session so the next command starts clean.
fn report(store: &SessionStore, err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Unauthorized => {
            if let Err(clear_err) = store.clear() {
                warn!(error = %clear_err, "failed to clear expired session");
            }
            anyhow::anyhow!("session expired -- run `reef login` again")
        }
        other => other.into(),
    }
}
