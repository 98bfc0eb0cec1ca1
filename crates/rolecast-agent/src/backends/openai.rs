use super::LlmBackend;
use crate::config::{LlmProvider, ModelConfig, SamplingParams};
use async_trait::async_trait;
use rolecast_core::{Message, RolecastError, RolecastResult, Role};
use std::time::Duration;
use tracing::debug;

/// OpenAI-compatible chat completions backend.
///
/// Serves Zhipu, OpenAI, OpenRouter, Groq and any other provider that accepts
/// `POST {base}/chat/completions` with bearer auth.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Build an HTTP client with the configured timeout.
    pub fn new(config: ModelConfig) -> RolecastResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RolecastError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    fn build_messages(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
    ) -> Vec<serde_json::Value> {
        let mut api_messages: Vec<serde_json::Value> = Vec::new();

        if let Some(sys) = system_prompt {
            api_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }

        for m in messages {
            if m.role == Role::System {
                continue;
            }
            api_messages.push(serde_json::json!({
                "role": m.role,
                "content": m.content
            }));
        }

        api_messages
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter attributes traffic by title
        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request.header("X-Title", "Rolecast")
        } else {
            request
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        sampling: &SamplingParams,
    ) -> RolecastResult<String> {
        let url = format!("{}/chat/completions", self.config.base_url());
        let api_messages = self.build_messages(system_prompt, messages);

        let body = serde_json::json!({
            "model": self.config.model_id(),
            "max_tokens": self.config.max_tokens,
            "temperature": sampling.temperature,
            "top_p": sampling.top_p,
            "messages": api_messages,
        });

        debug!(
            url = %url,
            model = self.config.model_id(),
            messages = api_messages.len(),
            "Sending chat completion request"
        );

        let request = self.add_provider_headers(self.http.post(&url));

        let resp = request
            .json(&body)
            .send()
            .await
            .map_err(|e| RolecastError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RolecastError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(RolecastError::Http(format!(
                "{:?} API error {}: {}",
                self.config.provider, status, text
            )));
        }

        let resp_body: serde_json::Value = serde_json::from_str(&text)?;
        parse_chat_response(&resp_body)
    }
}

/// Extract `choices[0].message.content` from a chat completion body.
pub fn parse_chat_response(body: &serde_json::Value) -> RolecastResult<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            RolecastError::Generation(format!("response carried no message content: {body}"))
        })
}
