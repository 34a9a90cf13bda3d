use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::chat::Transcript;
use crate::config::ReefConfig;
use crate::session_store::SessionStore;
use crate::ws::{ChatMessage, SendError, SessionChannel, SessionEvent};

/// Join the live chat. Stdin lines become sends; inbound messages render as
/// `sender: content`. Ctrl-D leaves the view and tears the channel down.
pub async fn chat(config: &ReefConfig) -> Result<()> {
    let session = SessionStore::new(&config.data_dir).load();
    match &session {
        Some(s) => println!("[reef: joining chat as {}]", s.user.username),
        None => println!("[reef: joining chat read-only -- `reef login` to post]"),
    }

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let channel = SessionChannel::open(
        config.file.chat.ws_url.clone(),
        config.file.chat.history_limit,
        session.as_ref(),
        events_tx,
    );

    let mut transcript = Transcript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match channel.send(line) {
                        Ok(()) => {}
                        Err(SendError::NoCredential) => {
                            eprintln!("[reef: log in to post]");
                        }
                        // Dropped sends are not recovered.
                        Err(SendError::NotConnected) => {
                            eprintln!("[reef: not connected -- message dropped]");
                        }
                    }
                }
                // Ctrl-D: the view unmounts.
                None => break,
            },

            event = events.recv() => match event {
                Some(SessionEvent::Opened) => println!("[reef: connected]"),
                Some(SessionEvent::History(messages)) => {
                    transcript.replace_all(messages);
                    render_all(&transcript);
                }
                Some(SessionEvent::Message(message)) => {
                    render_line(&message);
                    transcript.append(message);
                }
                Some(SessionEvent::Error(err)) => eprintln!("[reef: chat error: {err}]"),
                Some(SessionEvent::Closed) | None => {
                    println!("[reef: disconnected]");
                    break;
                }
            },
        }
    }

    channel.close();
    Ok(())
}

fn render_all(transcript: &Transcript) {
    for message in transcript.messages() {
        render_line(message);
    }
}

fn render_line(message: &ChatMessage) {
    println!("{}: {}", message.sender, message.content);
}
