//! Real-time chat over the forum service's WebSocket endpoint.
//!
//! `protocol` defines the frame shapes on the wire; `session` owns the one
//! live connection and its lifecycle (connect → auth → history replay →
//! live dispatch → teardown).

pub mod protocol;
pub mod session;

pub use protocol::{ChatMessage, ChatPost, ClientFrame, ServerFrame};
pub use session::{SendError, SessionChannel, SessionError, SessionEvent};
