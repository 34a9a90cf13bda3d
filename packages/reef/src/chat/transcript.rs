use crate::ws::protocol::{ChatMessage, ServerFrame};

/// Ordered chat transcript. Insertion order is display order: messages are
/// never re-sorted by timestamp and never deduplicated. A history snapshot
/// is a full swap; if the server re-broadcasts a message already delivered
/// via history, it shows up twice.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total overwrite from a bulk history payload. Last snapshot wins.
    pub fn replace_all(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    /// Append one live message at the end.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Fold one parsed inbound frame into the transcript.
    pub fn apply(&mut self, frame: ServerFrame) {
        match frame {
            ServerFrame::History(messages) => self.replace_all(messages),
            ServerFrame::Message(message) => self.append(message),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
