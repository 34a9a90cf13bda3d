use anyhow::Result;

use reef_api::{ForumClient, NewPost};

use crate::cli::{report, require_session};
use crate::config::ReefConfig;
use crate::session_store::SessionStore;

/// Render the feed. Works logged-out; with a session present, posts the
/// current user may delete are annotated.
pub async fn feed(config: &ReefConfig) -> Result<()> {
    let client = ForumClient::new(config.file.services.forum_url.clone());
    let posts = client.posts().await?;
    if posts.is_empty() {
        println!("No posts yet.");
        return Ok(());
    }

    let session = SessionStore::new(&config.data_dir).load();
    for post in &posts {
        let author = if post.author.is_empty() {
            "unknown"
        } else {
            post.author.as_str()
        };
        println!("#{}  {}  by {}", post.id, post.title, author);
        println!("    {}", post.content);
        let deletable = session
            .as_ref()
            .is_some_and(|s| post.deletable_by(&s.user));
        if deletable {
            println!("    (yours -- `reef delete {}` removes it)", post.id);
        }
    }
    Ok(())
}

pub async fn compose(config: &ReefConfig, title: String, content: String) -> Result<()> {
    let store = SessionStore::new(&config.data_dir);
    let session = require_session(&store)?;
    let client = ForumClient::new(config.file.services.forum_url.clone());
    let new_post = NewPost { title, content };
    match client.create_post(&session.token, &new_post).await {
        Ok(post) => {
            println!("Created post #{}: {}", post.id, post.title);
            Ok(())
        }
        Err(err) => Err(report(&store, err)),
    }
}

pub async fn delete(config: &ReefConfig, id: i64) -> Result<()> {
    let store = SessionStore::new(&config.data_dir);
    let session = require_session(&store)?;
    let client = ForumClient::new(config.file.services.forum_url.clone());
    match client.delete_post(&session.token, id).await {
        Ok(()) => {
            println!("Deleted post #{id}.");
            Ok(())
        }
        Err(err) => Err(report(&store, err)),
    }
}
