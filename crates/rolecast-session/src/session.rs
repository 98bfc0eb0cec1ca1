use crate::names::display_name;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp layout used for session identifiers and file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One of the two simulated characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// The first character; always opens the dialogue.
    #[serde(rename = "角色1")]
    Character1,
    /// The second character.
    #[serde(rename = "角色2")]
    Character2,
}

impl Speaker {
    /// The speaker who talks next.
    pub fn other(self) -> Self {
        match self {
            Self::Character1 => Self::Character2,
            Self::Character2 => Self::Character1,
        }
    }

    /// 1 or 2.
    pub fn number(self) -> u8 {
        match self {
            Self::Character1 => 1,
            Self::Character2 => 2,
        }
    }

    /// Generic label used in prompts and persisted records.
    pub fn label(self) -> &'static str {
        match self {
            Self::Character1 => "角色1",
            Self::Character2 => "角色2",
        }
    }
}

/// Where the content of a [`Turn`] came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnSource {
    /// Generated by the model.
    #[default]
    Model,
    /// Substituted from the fixed fallback list after a failed call.
    Fallback,
}

/// One utterance by one of the two characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who is speaking.
    #[serde(rename = "role")]
    pub speaker: Speaker,
    /// What they say.
    pub content: String,
    /// Records written before provenance existed load as [`TurnSource::Model`].
    #[serde(default)]
    pub source: TurnSource,
}

impl Turn {
    /// A turn generated by the model.
    pub fn generated(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
            source: TurnSource::Model,
        }
    }

    /// A turn substituted from the fallback list.
    pub fn fallback(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
            source: TurnSource::Fallback,
        }
    }

    /// Whether this turn's content is a substitute.
    pub fn is_fallback(&self) -> bool {
        self.source == TurnSource::Fallback
    }
}

/// A persona together with the name extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Best-effort display name, or the unknown sentinel.
    pub name: String,
    /// The full persona text.
    pub profile: String,
}

impl CharacterProfile {
    /// Wraps a persona, extracting its display name.
    pub fn from_profile(profile: impl Into<String>) -> Self {
        let profile = profile.into();
        Self {
            name: display_name(&profile),
            profile,
        }
    }
}

/// Both participants of a dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characters {
    /// The opening speaker.
    pub character1: CharacterProfile,
    /// The responding speaker.
    pub character2: CharacterProfile,
}

impl Characters {
    /// The profile belonging to `speaker`.
    pub fn get(&self, speaker: Speaker) -> &CharacterProfile {
        match speaker {
            Speaker::Character1 => &self.character1,
            Speaker::Character2 => &self.character2,
        }
    }
}

/// The persisted record of one dialogue run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSession {
    /// Local generation time, formatted with [`TIMESTAMP_FORMAT`]. Doubles as
    /// the session identifier.
    pub timestamp: String,
    /// Both personas.
    pub characters: Characters,
    /// Ordered turns.
    #[serde(rename = "dialogues")]
    pub turns: Vec<Turn>,
}

impl DialogueSession {
    /// Builds a session stamped with the current local time.
    pub fn new(
        character1: impl Into<String>,
        character2: impl Into<String>,
        turns: Vec<Turn>,
    ) -> Self {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        Self::with_timestamp(timestamp, character1, character2, turns)
    }

    /// Builds a session with an explicit timestamp.
    pub fn with_timestamp(
        timestamp: impl Into<String>,
        character1: impl Into<String>,
        character2: impl Into<String>,
        turns: Vec<Turn>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            characters: Characters {
                character1: CharacterProfile::from_profile(character1),
                character2: CharacterProfile::from_profile(character2),
            },
            turns,
        }
    }

    /// Display name of `speaker`.
    pub fn speaker_name(&self, speaker: Speaker) -> &str {
        &self.characters.get(speaker).name
    }

    /// Number of turns that hold fallback content.
    pub fn fallback_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_fallback()).count()
    }
}
