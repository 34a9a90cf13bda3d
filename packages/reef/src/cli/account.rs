use anyhow::Result;
use tracing::info;

use reef_api::{AuthClient, AuthSuccess, LoginRequest, RegisterRequest, UserProfile};

use crate::config::ReefConfig;
use crate::session_store::{Session, SessionStore};

pub async fn register(
    config: &ReefConfig,
    username: String,
    password: String,
    email: String,
) -> Result<()> {
    let client = AuthClient::new(config.file.services.auth_url.clone());
    let request = RegisterRequest {
        username: username.clone(),
        password,
        email,
    };
    let success = client.register(&request).await?;
    info!(username = %username, "account created");
    persist(config, success, username)
}

pub async fn login(config: &ReefConfig, username: String, password: String) -> Result<()> {
    let client = AuthClient::new(config.file.services.auth_url.clone());
    let request = LoginRequest {
        username: username.clone(),
        password,
    };
    let success = client.login(&request).await?;
    persist(config, success, username)
}

pub fn logout(config: &ReefConfig) -> Result<()> {
    SessionStore::new(&config.data_dir).clear()?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(config: &ReefConfig) -> Result<()> {
    match SessionStore::new(&config.data_dir).load() {
        Some(session) => println!(
            "Logged in as {} (user id {})",
            session.user.username, session.user.id
        ),
        None => println!("Not logged in."),
    }
    Ok(())
}

/// Persist the session a successful register/login handed back. The register
/// response omits the username, so fall back to what the user typed.
fn persist(config: &ReefConfig, success: AuthSuccess, typed_username: String) -> Result<()> {
    let username = if success.username.is_empty() {
        typed_username
    } else {
        success.username
    };
    let session = Session {
        token: success.access_token,
        user: UserProfile {
            id: success.user_id,
            username,
        },
    };
    SessionStore::new(&config.data_dir).save(&session)?;
    println!("Logged in as {}.", session.user.username);
    Ok(())
}
