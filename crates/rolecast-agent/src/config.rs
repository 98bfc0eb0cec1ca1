use rolecast_core::{RolecastError, RolecastResult};
use serde::{Deserialize, Serialize};

/// Chat-completion providers. All of them speak the OpenAI wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Zhipu AI open platform (ChatGLM models).
    #[default]
    Zhipu,
    /// OpenAI platform.
    OpenAi,
    /// OpenRouter model router.
    OpenRouter,
    /// Groq cloud inference, OpenAI-compatible.
    Groq,
}

impl LlmProvider {
    /// Base URL up to, not including, `/chat/completions`.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Zhipu => "https://open.bigmodel.cn/api/paas/v4",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
        }
    }

    /// Model used when the configuration names none.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Zhipu => "chatglm_turbo",
            Self::OpenAi => "gpt-4o-mini",
            Self::OpenRouter => "openai/gpt-4o-mini",
            Self::Groq => "llama-3.1-8b-instant",
        }
    }

    /// Provider-specific environment variable holding the API key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Zhipu => "ZHIPUAI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Groq => "GROQ_API_KEY",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = RolecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zhipu" | "zhipuai" | "glm" => Ok(Self::Zhipu),
            "openai" => Ok(Self::OpenAi),
            "openrouter" => Ok(Self::OpenRouter),
            "groq" => Ok(Self::Groq),
            other => Err(RolecastError::Config(format!("unknown provider '{other}'"))),
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
}

impl SamplingParams {
    /// Persona synthesis: moderately creative.
    pub const PERSONA: Self = Self {
        temperature: 0.7,
        top_p: 0.9,
    };

    /// Dialogue turns: a little more varied.
    pub const DIALOGUE: Self = Self {
        temperature: 0.8,
        top_p: 0.9,
    };
}

/// Everything needed to reach the model. Built once at startup and passed
/// into [`LlmClient::new`](crate::LlmClient::new).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Which provider to talk to.
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name; the provider default when unset or empty.
    #[serde(default)]
    pub model_id: Option<String>,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_key: String,
    /// Overrides the provider's base URL.
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Completion length limit per request.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout enforced by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling used for persona synthesis.
    #[serde(default = "default_persona_sampling")]
    pub persona_sampling: SamplingParams,
    /// Sampling used for dialogue turns.
    #[serde(default = "default_dialogue_sampling")]
    pub dialogue_sampling: SamplingParams,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_persona_sampling() -> SamplingParams {
    SamplingParams::PERSONA
}

fn default_dialogue_sampling() -> SamplingParams {
    SamplingParams::DIALOGUE
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model_id: None,
            api_key: String::new(),
            api_base_url: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            persona_sampling: default_persona_sampling(),
            dialogue_sampling: default_dialogue_sampling(),
        }
    }
}

impl ModelConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        match &self.api_base_url {
            Some(url) => url.trim_end_matches('/'),
            None => self.provider.default_base_url(),
        }
    }

    /// The model to request.
    pub fn model_id(&self) -> &str {
        self.model_id
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Fails when no API key is set. Run before any generation work.
    pub fn validate(&self) -> RolecastResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(RolecastError::Config(format!(
                "missing API key for provider {:?} (set {} or pass --api-key)",
                self.provider,
                self.provider.api_key_env()
            )));
        }
        Ok(())
    }
}
