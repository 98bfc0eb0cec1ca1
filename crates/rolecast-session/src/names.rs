/// Sentinel display name used when a persona carries no recognizable name line.
pub const UNKNOWN_CHARACTER: &str = "未知角色";

/// Label tokens that mark the name line of a persona, most specific first.
const NAME_LABELS: [&str; 3] = ["角色名称", "名称", "姓名"];

/// Pull the character name out of free-text persona.
///
/// Takes the first line mentioning one of the name labels and returns whatever
/// follows its last colon (full-width or ASCII). Markdown emphasis around the
/// value is dropped. This is a heuristic over model output, so it never fails:
/// lines without a colon yield the whole line, and an empty value yields `None`.
pub fn extract_character_name(profile: &str) -> Option<String> {
    let line = profile
        .lines()
        .find(|line| NAME_LABELS.iter().any(|label| line.contains(label)))?;

    let value = line
        .rsplit(|c: char| c == '：' || c == ':')
        .next()
        .unwrap_or(line)
        .trim()
        .trim_matches('*')
        .trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// [`extract_character_name`] with the [`UNKNOWN_CHARACTER`] sentinel.
pub fn display_name(profile: &str) -> String {
    extract_character_name(profile).unwrap_or_else(|| UNKNOWN_CHARACTER.to_string())
}
