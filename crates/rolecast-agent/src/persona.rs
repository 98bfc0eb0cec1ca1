use crate::config::SamplingParams;
use crate::fallback::{fallback_persona, FallbackExt};
use crate::llm::LlmClient;
use rolecast_core::Message;
use tracing::info;

/// Builds character personas from source text with a single model call.
pub struct PersonaSynthesizer {
    llm: LlmClient,
    sampling: SamplingParams,
}

impl PersonaSynthesizer {
    /// Create a synthesizer that samples with `sampling`.
    pub fn new(llm: LlmClient, sampling: SamplingParams) -> Self {
        Self { llm, sampling }
    }

    /// Synthesize a persona from `text`, optionally pinned to `name`.
    ///
    /// Makes exactly one attempt. On any failure the fixed fallback persona is
    /// returned instead, so the result is never empty.
    pub async fn synthesize(&self, text: &str, name: Option<&str>) -> String {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        info!(name = name.unwrap_or("<model chooses>"), "Synthesizing persona from text");

        let prompt = persona_prompt(text, name);
        let persona = self
            .llm
            .chat(None, &[Message::user(prompt)], &self.sampling)
            .await
            .or_fallback("persona", || fallback_persona(name));

        info!(chars = persona.chars().count(), "Persona ready");
        persona
    }
}

/// The single user prompt asking for a structured persona.
pub fn persona_prompt(text: &str, name: Option<&str>) -> String {
    let name_instruction = match name {
        Some(name) => format!("请将角色名称设置为'{name}'。"),
        None => "请自行创建一个合适的角色名称。".to_string(),
    };

    format!(
        "请根据以下文本创建一个角色人设。{name_instruction}人设应包括：\n\
         1. 角色名称\n\
         2. 年龄\n\
         3. 性别\n\
         4. 外貌特征\n\
         5. 性格特点\n\
         6. 说话风格和习惯用语\n\
         7. 背景故事\n\
         8. 行为方式和习惯\n\
         \n\
         以下是文本：\n\
         {text}\n\
         \n\
         请以结构化的格式输出完整的角色人设："
    )
}
