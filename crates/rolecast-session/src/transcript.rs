use crate::session::{DialogueSession, Speaker};

const RULE_WIDTH: usize = 50;

/// Render a session as a human-readable transcript.
///
/// Both personas come first, then a ruled header, then one paragraph per turn
/// labelled with the speaker's extracted name.
pub fn render_transcript(session: &DialogueSession) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    for speaker in [Speaker::Character1, Speaker::Character2] {
        let character = session.characters.get(speaker);
        out.push_str(&format!(
            "{} ({}):\n{}\n\n",
            speaker.label(),
            character.name,
            character.profile
        ));
    }

    out.push_str(&format!("{rule}\n对话内容\n{rule}\n\n"));

    for turn in &session.turns {
        out.push_str(&format!(
            "{}: {}\n\n",
            session.speaker_name(turn.speaker),
            turn.content
        ));
    }

    out
}
