use rolecast_agent::PersonaSynthesizer;
use rolecast_core::{RolecastError, RolecastResult};
use std::path::PathBuf;
use tracing::info;

/// Excerpt from *Dream of the Red Chamber* used when no source text is given.
pub const SAMPLE_TEXT: &str = "\
# 《红楼梦》节选

贾母笑道：\"你这个老货，真是又耳聋又眼花的。这是宝玉的小丫头襻纱，那是宝玉的。襻纱因那日开了稍子，拿去给他作那镯子的带子，宝玉见了，说送给她去了。你敢说是我们家的丫头就拿了去了的不成？\"刘姥姥听了，忙陪笑道：\"我眼花，我眼花。姑娘家大了，他们那里肯亲近这些东西。依我说，小姑娘大了，身上带的东西，越发要好才是，姑娘的体面多显得大方。姑娘一出门，人家只看这些妆饰，就知道是大家小姐了。

只见凤姐儿笑向宝钗道：\"你瞧瞧这老货，'吃着碗里瞧着锅里'，这会子又拿你来讨好儿。\"刘姥姥听了，忙笑道：\"这那里说起，我见姑娘说话理道儿又好听，又有救人的心肠，怎么不正眼儿瞧瞧我．没的不讨一口好气儿呢。\"
";

/// Names pinned when synthesizing from [`SAMPLE_TEXT`].
pub const SAMPLE_NAMES: (&str, &str) = ("贾母", "刘姥姥");

/// Name given to character 2 when only character 1 was named.
pub const SECOND_CHARACTER_NAME: &str = "另一个角色";

/// What the user supplied on the command line.
#[derive(Debug, Default)]
pub struct PersonaRequest {
    pub text_file: Option<PathBuf>,
    pub char1: Option<String>,
    pub char2: Option<String>,
    pub name1: Option<String>,
    pub name2: Option<String>,
}

/// Fill in whichever personas are missing.
///
/// Supplied personas are kept. Missing ones come from the text file when one
/// is given, otherwise from [`SAMPLE_TEXT`]. An unreadable text file is an
/// input error and aborts the run.
pub async fn resolve_personas(
    synthesizer: &PersonaSynthesizer,
    request: PersonaRequest,
) -> RolecastResult<(String, String)> {
    let mut char1 = non_blank(request.char1);
    let mut char2 = non_blank(request.char2);
    let name1 = non_blank(request.name1);
    let name2 = non_blank(request.name2);

    if let Some(path) = &request.text_file {
        if char1.is_none() || char2.is_none() {
            let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                RolecastError::Input(format!("Failed to read text file '{}': {e}", path.display()))
            })?;
            info!(path = %path.display(), chars = text.chars().count(), "Source text loaded");

            if char1.is_none() {
                char1 = Some(synthesize(synthesizer, 1, &text, name1.as_deref()).await);
            }
            if char2.is_none() {
                let name2 = match (&name2, &name1) {
                    (Some(name), _) => Some(name.as_str()),
                    (None, Some(_)) => Some(SECOND_CHARACTER_NAME),
                    (None, None) => None,
                };
                char2 = Some(synthesize(synthesizer, 2, &text, name2).await);
            }
        }
    }

    if char1.is_none() || char2.is_none() {
        println!("使用示例文本生成角色人设...");
    }
    let char1 = match char1 {
        Some(persona) => persona,
        None => synthesize(synthesizer, 1, SAMPLE_TEXT, Some(SAMPLE_NAMES.0)).await,
    };
    let char2 = match char2 {
        Some(persona) => persona,
        None => synthesize(synthesizer, 2, SAMPLE_TEXT, Some(SAMPLE_NAMES.1)).await,
    };

    Ok((char1, char2))
}

async fn synthesize(
    synthesizer: &PersonaSynthesizer,
    number: u8,
    text: &str,
    name: Option<&str>,
) -> String {
    println!("正在生成角色{number}的人设...");
    let persona = synthesizer.synthesize(text, name).await;
    println!("角色{number}人设:\n{persona}\n");
    persona
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
