/// OpenAI-compatible chat completions.
pub mod openai;

use crate::config::SamplingParams;
use async_trait::async_trait;
use rolecast_core::{Message, RolecastResult};

/// Trait for chat-completion provider backends.
///
/// A backend sends one request and returns the generated text. It does not
/// retry and does not substitute fallbacks; callers decide what a failure
/// means.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Non-streaming chat completion.
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        sampling: &SamplingParams,
    ) -> RolecastResult<String>;
}
