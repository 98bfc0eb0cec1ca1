use crate::backends::openai::OpenAiBackend;
use crate::backends::LlmBackend;
use crate::config::{ModelConfig, SamplingParams};
use rolecast_core::{Message, RolecastError, RolecastResult};
use std::sync::Arc;

/// LLM client that dispatches to a provider backend.
///
/// Cheap to clone; the persona synthesizer and the dialogue engine share one.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn LlmBackend>,
}

impl LlmClient {
    /// Build the backend for `config.provider`.
    pub fn new(config: ModelConfig) -> RolecastResult<Self> {
        // Every supported provider speaks the OpenAI chat completions format.
        let backend = OpenAiBackend::new(config)?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    /// Create from a pre-built backend (for custom providers and tests).
    pub fn from_backend(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Non-streaming chat completion. Blank replies count as failures.
    pub async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        sampling: &SamplingParams,
    ) -> RolecastResult<String> {
        let text = self.backend.chat(system_prompt, messages, sampling).await?;
        if text.trim().is_empty() {
            return Err(RolecastError::Generation("model returned an empty reply".into()));
        }
        Ok(text)
    }
}
