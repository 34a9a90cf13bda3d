//! Session Channel
//!
//! Owns the one live WebSocket connection to the chat endpoint. Lifecycle:
//! connect → auth frame (when a credential is present) → history request →
//! inbound dispatch → teardown. There is no reconnect or backoff: a dropped
//! connection goes quiet until the view opens a fresh channel, and a
//! credential change always means a brand-new connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::{WebSocketStream, connect_async, tungstenite};
use tracing::{debug, warn};

use crate::session_store::Session;
use crate::ws::protocol::{ChatMessage, ChatPost, ClientFrame, ServerFrame};

/// What the channel reports back to its owning view.
#[derive(Debug)]
pub enum SessionEvent {
    /// Transport established; auth and history request are on the wire.
    Opened,
    /// Bulk history snapshot. Replaces the transcript wholesale.
    History(Vec<ChatMessage>),
    /// One live message to append.
    Message(ChatMessage),
    /// Connection could not be established, or died mid-session.
    Error(SessionError),
    /// Teardown finished; no further events will arrive.
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to connect to chat endpoint")]
    Connect(#[source] tungstenite::Error),
    #[error("chat transport failed")]
    Transport(#[source] tungstenite::Error),
    #[error("failed to encode chat frame")]
    Encode(#[source] serde_json::Error),
}

/// Why a `send` was refused. Nothing is queued or retried: a refused send
/// is gone, and the caller decides whether to tell the user.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("chat connection is not open")]
    NotConnected,
    #[error("sending requires a logged-in session")]
    NoCredential,
}

/// The sender identity stamped onto outgoing posts.
#[derive(Debug, Clone)]
struct Identity {
    username: String,
    user_id: i64,
}

enum Command {
    Post(ChatPost),
    Close,
}

/// Handle to the live connection. At most one exists per chat view.
pub struct SessionChannel {
    commands: mpsc::UnboundedSender<Command>,
    open: Arc<AtomicBool>,
    identity: Option<Identity>,
}

impl SessionChannel {
    /// Open a connection to `url` and return immediately; establishment is
    /// reported as [`SessionEvent::Opened`] (or [`SessionEvent::Error`]) on
    /// the events channel. With a session present, an auth frame goes out
    /// first, then the history request; the server may gate history on
    /// identity.
    pub fn open(
        url: impl Into<String>,
        history_limit: u32,
        session: Option<&Session>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let identity = session.map(|s| Identity {
            username: s.user.username.clone(),
            user_id: s.user.id,
        });
        let token = session.map(|s| s.token.clone());
        let url = url.into();
        let flag = open.clone();
        tokio::spawn(async move {
            match connect_async(&url).await {
                Ok((ws, _)) => drive(ws, token, history_limit, commands_rx, events, flag).await,
                Err(err) => {
                    warn!(error = %err, url = %url, "chat connection failed");
                    let _ = events.send(SessionEvent::Error(SessionError::Connect(err)));
                    let _ = events.send(SessionEvent::Closed);
                }
            }
        });
        Self {
            commands: commands_tx,
            open,
            identity,
        }
    }

    /// Attach to an already-established transport instead of dialing.
    #[cfg(test)]
    fn open_on<S>(
        ws: WebSocketStream<S>,
        history_limit: u32,
        session: Option<&Session>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let identity = session.map(|s| Identity {
            username: s.user.username.clone(),
            user_id: s.user.id,
        });
        let token = session.map(|s| s.token.clone());
        tokio::spawn(drive(
            ws,
            token,
            history_limit,
            commands_rx,
            events,
            open.clone(),
        ));
        Self {
            commands: commands_tx,
            open,
            identity,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Post a message. Requires an open connection and a logged-in session;
    /// otherwise the send is refused with a typed error and nothing touches
    /// the wire.
    pub fn send(&self, content: &str) -> Result<(), SendError> {
        let identity = self.identity.as_ref().ok_or(SendError::NoCredential)?;
        if !self.is_open() {
            return Err(SendError::NotConnected);
        }
        let post = ChatPost::new(content, identity.username.clone(), identity.user_id);
        self.commands
            .send(Command::Post(post))
            .map_err(|_| SendError::NotConnected)
    }

    /// Scoped teardown. Idempotent, and harmless while the connection is
    /// still being established — the close is processed as soon as the
    /// session task sees it.
    pub fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }
}

/// Run one session to completion, maintaining the open flag and the
/// Opened/Closed bookends around it.
async fn drive<S>(
    ws: WebSocketStream<S>,
    token: Option<String>,
    history_limit: u32,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SessionEvent>,
    open: Arc<AtomicBool>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    open.store(true, Ordering::SeqCst);
    let _ = events.send(SessionEvent::Opened);
    if let Err(err) = run_session(ws, token, history_limit, commands, &events).await {
        warn!(error = %err, "chat session ended with error");
        let _ = events.send(SessionEvent::Error(err));
    }
    open.store(false, Ordering::SeqCst);
    let _ = events.send(SessionEvent::Closed);
}

async fn run_session<S>(
    ws: WebSocketStream<S>,
    token: Option<String>,
    history_limit: u32,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_write, mut ws_read) = ws.split();

    if let Some(token) = token {
        send_frame(&mut ws_write, &ClientFrame::Auth { token }).await?;
    }
    send_frame(
        &mut ws_write,
        &ClientFrame::GetHistory {
            limit: history_limit,
        },
    )
    .await?;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Post(post)) => {
                    let json = serde_json::to_string(&post).map_err(SessionError::Encode)?;
                    if ws_write.send(tungstenite::Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                // Explicit close, or every handle dropped.
                Some(Command::Close) | None => {
                    let _ = ws_write.send(tungstenite::Message::Close(None)).await;
                    break;
                }
            },
            frame = ws_read.next() => match frame {
                Some(Ok(tungstenite::Message::Text(text))) => dispatch(&text, events),
                Some(Ok(tungstenite::Message::Close(_))) | None => break,
                // Binary/ping/pong carry nothing for us.
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(SessionError::Transport(err)),
            },
        }
    }
    Ok(())
}

async fn send_frame<S>(
    write: &mut SplitSink<WebSocketStream<S>, tungstenite::Message>,
    frame: &ClientFrame,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let json = serde_json::to_string(frame).map_err(SessionError::Encode)?;
    write
        .send(tungstenite::Message::Text(json.into()))
        .await
        .map_err(SessionError::Transport)
}

/// Parse one inbound text payload: an array replaces the transcript, a lone
/// record appends. Malformed payloads are logged and dropped — they must
/// never tear the connection down or disturb the transcript.
fn dispatch(text: &str, events: &mpsc::UnboundedSender<SessionEvent>) {
    match serde_json::from_str::<ServerFrame>(text) {
        Ok(ServerFrame::History(messages)) => {
            debug!(count = messages.len(), "history replay received");
            let _ = events.send(SessionEvent::History(messages));
        }
        Ok(ServerFrame::Message(message)) => {
            let _ = events.send(SessionEvent::Message(message));
        }
        Err(err) => warn!(error = %err, "dropping malformed chat frame"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Transcript;
    use reef_api::UserProfile;
    use tokio::io::DuplexStream;
    use tokio_tungstenite::{accept_async, client_async};

    fn logged_in() -> Session {
        Session {
            token: "tok123".into(),
            user: UserProfile {
                id: 1,
                username: "a".into(),
            },
        }
    }

    /// Client and server ends of a WebSocket over an in-memory pipe.
    async fn ws_pair() -> (
        WebSocketStream<DuplexStream>,
        WebSocketStream<DuplexStream>,
    ) {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move { accept_async(server_io).await.unwrap() });
        let (client, _) = client_async("ws://reef.test/ws", client_io).await.unwrap();
        (client, server.await.unwrap())
    }

    async fn recv_json(server: &mut WebSocketStream<DuplexStream>) -> serde_json::Value {
        let msg = server.next().await.unwrap().unwrap();
        serde_json::from_str(msg.to_text().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_auth_frame_precedes_history_request() {
        let (client, mut server) = ws_pair().await;
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let session = logged_in();
        let _channel = SessionChannel::open_on(client, 100, Some(&session), events_tx);

        let first = recv_json(&mut server).await;
        assert_eq!(first["type"], "auth");
        assert_eq!(first["token"], "tok123");

        let second = recv_json(&mut server).await;
        assert_eq!(second["type"], "get_history");
        assert_eq!(second["limit"], 100);
    }

    #[tokio::test]
    async fn test_anonymous_open_skips_auth() {
        let (client, mut server) = ws_pair().await;
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let _channel = SessionChannel::open_on(client, 50, None, events_tx);

        let first = recv_json(&mut server).await;
        assert_eq!(first["type"], "get_history");
        assert_eq!(first["limit"], 50);
    }

    #[tokio::test]
    async fn test_history_replaces_then_live_appends() {
        let (client, mut server) = ws_pair().await;
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let session = logged_in();
        let _channel = SessionChannel::open_on(client, 100, Some(&session), events_tx);

        recv_json(&mut server).await;
        recv_json(&mut server).await;
        assert!(matches!(events_rx.recv().await, Some(SessionEvent::Opened)));

        let history = r#"[{"id":1,"sender":"a","userId":1,"content":"hi","timestamp":1000}]"#;
        server
            .send(tungstenite::Message::Text(history.into()))
            .await
            .unwrap();

        let mut transcript = Transcript::new();
        match events_rx.recv().await {
            Some(SessionEvent::History(messages)) => transcript.replace_all(messages),
            other => panic!("Expected History, got {other:?}"),
        }
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0].content, "hi");
        assert_eq!(transcript.messages()[0].id, Some(1));

        let live = r#"{"sender":"b","userId":2,"content":"yo","timestamp":2000}"#;
        server
            .send(tungstenite::Message::Text(live.into()))
            .await
            .unwrap();
        match events_rx.recv().await {
            Some(SessionEvent::Message(message)) => transcript.append(message),
            other => panic!("Expected Message, got {other:?}"),
        }
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].content, "hi");
        assert_eq!(transcript.messages()[1].content, "yo");
    }

    #[tokio::test]
    async fn test_malformed_frame_is_dropped_not_fatal() {
        let (client, mut server) = ws_pair().await;
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let _channel = SessionChannel::open_on(client, 100, None, events_tx);

        recv_json(&mut server).await;
        assert!(matches!(events_rx.recv().await, Some(SessionEvent::Opened)));

        server
            .send(tungstenite::Message::Text("not json at all".into()))
            .await
            .unwrap();
        let live = r#"{"sender":"b","userId":2,"content":"still here","timestamp":2000}"#;
        server
            .send(tungstenite::Message::Text(live.into()))
            .await
            .unwrap();

        // The garbage produced no event; the connection survived it.
        match events_rx.recv().await {
            Some(SessionEvent::Message(message)) => assert_eq!(message.content, "still here"),
            other => panic!("Expected Message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_without_credential_transmits_nothing() {
        let (client, mut server) = ws_pair().await;
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let channel = SessionChannel::open_on(client, 100, None, events_tx);

        assert!(matches!(events_rx.recv().await, Some(SessionEvent::Opened)));
        let first = recv_json(&mut server).await;
        assert_eq!(first["type"], "get_history");

        assert_eq!(channel.send("hello"), Err(SendError::NoCredential));

        // Close; the very next wire frame must be the close handshake,
        // proving no chat post ever went out.
        channel.close();
        let next = server.next().await.unwrap().unwrap();
        assert!(next.is_close());
    }

    #[tokio::test]
    async fn test_send_stamps_identity_and_numeric_tag() {
        let (client, mut server) = ws_pair().await;
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let session = logged_in();
        let channel = SessionChannel::open_on(client, 100, Some(&session), events_tx);

        assert!(matches!(events_rx.recv().await, Some(SessionEvent::Opened)));
        recv_json(&mut server).await;
        recv_json(&mut server).await;

        channel.send("hello").unwrap();
        let frame = recv_json(&mut server).await;
        assert_eq!(frame["type"], 1);
        assert_eq!(frame["content"], "hello");
        assert_eq!(frame["sender"], "a");
        assert_eq!(frame["userId"], 1);
        assert!(frame["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_no_events_after_close() {
        let (client, mut server) = ws_pair().await;
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let session = logged_in();
        let channel = SessionChannel::open_on(client, 100, Some(&session), events_tx);

        recv_json(&mut server).await;
        recv_json(&mut server).await;
        assert!(matches!(events_rx.recv().await, Some(SessionEvent::Opened)));

        channel.close();
        loop {
            match events_rx.recv().await {
                Some(SessionEvent::Closed) => break,
                Some(_) => continue,
                None => panic!("Expected Closed before the event stream ended"),
            }
        }
        assert!(!channel.is_open());

        // A frame arriving after close must produce no event at all.
        let late = r#"{"sender":"b","userId":2,"content":"late","timestamp":3000}"#;
        let _ = server.send(tungstenite::Message::Text(late.into())).await;
        assert!(events_rx.recv().await.is_none());

        // And sends are refused once the connection is gone.
        assert_eq!(channel.send("hello"), Err(SendError::NotConnected));
    }

    #[tokio::test]
    async fn test_connect_failure_is_observable() {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        // Nothing listens here.
        let channel = SessionChannel::open("ws://127.0.0.1:1/ws", 100, None, events_tx);

        match events_rx.recv().await {
            Some(SessionEvent::Error(SessionError::Connect(_))) => {}
            other => panic!("Expected Connect error, got {other:?}"),
        }
        assert!(matches!(events_rx.recv().await, Some(SessionEvent::Closed)));
        assert!(!channel.is_open());
    }
}
