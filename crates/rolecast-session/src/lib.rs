//! Dialogue session records and their persistence.
//!
//! A finished dialogue run becomes a [`DialogueSession`]: both personas with
//! best-effort display names, the ordered [`Turn`]s, and a timestamp. The
//! [`FileSessionStore`] writes it as a JSON record plus a readable transcript.

/// Best-effort display-name extraction from persona text.
pub mod names;
/// Session record types.
pub mod session;
/// Session persistence.
pub mod store;
/// Plain-text transcript rendering.
pub mod transcript;

pub use names::{display_name, extract_character_name, UNKNOWN_CHARACTER};
pub use session::{CharacterProfile, Characters, DialogueSession, Speaker, Turn, TurnSource};
pub use store::{FileSessionStore, SavedSession, SessionStore};
pub use transcript::render_transcript;
