//! The transcript shown to the user, fed by session events.

mod transcript;

pub use transcript::Transcript;
