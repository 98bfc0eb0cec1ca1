use rolecast_agent::{LlmProvider, ModelConfig};
use rolecast_core::{RolecastError, RolecastResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Provider-independent environment variable checked before the provider's own.
pub const API_KEY_ENV: &str = "ROLECAST_API_KEY";

/// Settings loaded from `rolecast.toml`. Every field has a default, so a
/// missing file is the same as an empty one.
#[derive(Debug, Deserialize)]
pub struct RolecastConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Pause between dialogue turns; 0 disables pacing.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default)]
    pub default_scenario: Option<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_pacing_ms() -> u64 {
    1000
}

impl Default for RolecastConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            output_dir: default_output_dir(),
            pacing_ms: default_pacing_ms(),
            default_scenario: None,
        }
    }
}

impl RolecastConfig {
    /// Load from `path`, or fall back to defaults when the file does not exist.
    pub async fn load(path: &Path) -> RolecastResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            RolecastError::Config(format!("Failed to read config file '{}': {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            RolecastError::Config(format!("Invalid config file '{}': {e}", path.display()))
        })?;
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }
}

/// Pick the API key: explicit flag, then config file, then environment.
///
/// `env` looks up an environment variable; blank values count as unset.
pub fn resolve_api_key(
    flag: Option<&str>,
    from_file: &str,
    provider: LlmProvider,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let non_blank = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    flag.and_then(non_blank)
        .or_else(|| non_blank(from_file))
        .or_else(|| env(API_KEY_ENV).as_deref().and_then(non_blank))
        .or_else(|| env(provider.api_key_env()).as_deref().and_then(non_blank))
}

/// Ask for the API key on stdin. An empty answer is a configuration error.
pub async fn prompt_api_key(provider: LlmProvider) -> RolecastResult<String> {
    eprint!("请输入 {provider:?} API 密钥: ");

    let input = tokio::task::spawn_blocking(|| {
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).map(|_| input)
    })
    .await
    .map_err(|e| RolecastError::Config(format!("API key prompt failed: {e}")))??;

    let key = input.trim();
    if key.is_empty() {
        return Err(RolecastError::Config(format!(
            "no API key provided (set {API_KEY_ENV} or {})",
            provider.api_key_env()
        )));
    }
    Ok(key.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn flag_wins() {
        let env = env_of(&[(API_KEY_ENV, "env-key")]);
        let key = resolve_api_key(Some("flag-key"), "file-key", LlmProvider::Zhipu, env);
        assert_eq!(key.as_deref(), Some("flag-key"));
    }

    #[test]
    fn file_before_environment() {
        let env = env_of(&[(API_KEY_ENV, "env-key")]);
        let key = resolve_api_key(None, "file-key", LlmProvider::Zhipu, env);
        assert_eq!(key.as_deref(), Some("file-key"));
    }

    #[test]
    fn generic_env_before_provider_env() {
        let env = env_of(&[(API_KEY_ENV, "generic"), ("ZHIPUAI_API_KEY", "zhipu")]);
        let key = resolve_api_key(None, "", LlmProvider::Zhipu, env);
        assert_eq!(key.as_deref(), Some("generic"));

        let env = env_of(&[("ZHIPUAI_API_KEY", " zhipu ")]);
        let key = resolve_api_key(None, "", LlmProvider::Zhipu, env);
        assert_eq!(key.as_deref(), Some("zhipu"));
    }

    #[test]
    fn provider_env_is_provider_specific() {
        let env = env_of(&[("ZHIPUAI_API_KEY", "zhipu")]);
        assert!(resolve_api_key(None, "", LlmProvider::OpenAi, env).is_none());
    }

    #[test]
    fn blank_values_are_unset() {
        let env = env_of(&[(API_KEY_ENV, "  ")]);
        assert!(resolve_api_key(Some(""), "   ", LlmProvider::Zhipu, env).is_none());
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = RolecastConfig::load(&tmp.path().join("rolecast.toml"))
            .await
            .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.pacing_ms, 1000);
        assert!(config.default_scenario.is_none());
        assert_eq!(config.model.provider, LlmProvider::Zhipu);
    }

    #[tokio::test]
    async fn file_values_are_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rolecast.toml");
        std::fs::write(
            &path,
            r#"
output_dir = "runs"
pacing_ms = 0
default_scenario = "在大观园里赏花"

[model]
provider = "openai"
model_id = "gpt-4o"
"#,
        )
        .unwrap();

        let config = RolecastConfig::load(&path).await.unwrap();
        assert_eq!(config.output_dir, PathBuf::from("runs"));
        assert_eq!(config.pacing_ms, 0);
        assert_eq!(config.default_scenario.as_deref(), Some("在大观园里赏花"));
        assert_eq!(config.model.provider, LlmProvider::OpenAi);
        assert_eq!(config.model.model_id(), "gpt-4o");
    }

    #[tokio::test]
    async fn invalid_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rolecast.toml");
        std::fs::write(&path, "pacing_ms = \"soon\"").unwrap();

        let err = RolecastConfig::load(&path).await.unwrap_err();
        assert!(matches!(err, RolecastError::Config(_)));
    }
}
