mod config;
mod personas;

use crate::config::{prompt_api_key, resolve_api_key, RolecastConfig};
use crate::personas::{resolve_personas, PersonaRequest};
use clap::Parser;
use rolecast_agent::pacing::pacer_from_millis;
use rolecast_agent::{DialogueEngine, LlmClient, LlmProvider, PersonaSynthesizer};
use rolecast_session::{DialogueSession, FileSessionStore, SessionStore};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rolecast",
    version,
    about = "Rolecast: synthesize two personas and let them talk"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "rolecast.toml")]
    config: PathBuf,

    /// API key (overrides config file and environment)
    #[arg(long)]
    api_key: Option<String>,

    /// Model provider: zhipu, openai, openrouter or groq
    #[arg(long)]
    provider: Option<LlmProvider>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Source text to synthesize personas from
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Persona text for character 1
    #[arg(long)]
    char1: Option<String>,

    /// Persona text for character 2
    #[arg(long)]
    char2: Option<String>,

    /// Name to pin when synthesizing character 1
    #[arg(long)]
    name1: Option<String>,

    /// Name to pin when synthesizing character 2
    #[arg(long)]
    name2: Option<String>,

    /// Turns per character
    #[arg(long, default_value_t = 5)]
    turns: u32,

    /// Opening scenario for the dialogue
    #[arg(long)]
    init_prompt: Option<String>,

    /// Directory for the saved record and transcript
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Pause between turns in milliseconds (0 disables)
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let default_level = if cli.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    debug!("Debug logging enabled");

    let mut config = RolecastConfig::load(&cli.config).await?;
    if let Some(provider) = cli.provider {
        config.model.provider = provider;
    }
    if let Some(model) = cli.model {
        config.model.model_id = Some(model);
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(ms) = cli.pacing_ms {
        config.pacing_ms = ms;
    }

    let provider = config.model.provider;
    config.model.api_key = match resolve_api_key(
        cli.api_key.as_deref(),
        &config.model.api_key,
        provider,
        |name| std::env::var(name).ok(),
    ) {
        Some(key) => key,
        None => prompt_api_key(provider).await?,
    };
    config.model.validate()?;

    info!(
        provider = ?provider,
        model = config.model.model_id(),
        base_url = config.model.base_url(),
        "Model configured"
    );

    let persona_sampling = config.model.persona_sampling;
    let dialogue_sampling = config.model.dialogue_sampling;
    let llm = LlmClient::new(config.model)?;
    let synthesizer = PersonaSynthesizer::new(llm.clone(), persona_sampling);
    let engine = DialogueEngine::new(llm, dialogue_sampling, pacer_from_millis(config.pacing_ms));

    let request = PersonaRequest {
        text_file: cli.text_file,
        char1: cli.char1,
        char2: cli.char2,
        name1: cli.name1,
        name2: cli.name2,
    };
    let (character1, character2) = resolve_personas(&synthesizer, request).await?;

    let scenario = cli.init_prompt.or(config.default_scenario);
    println!("开始生成 {} 轮对话...", cli.turns);
    let dialogue = engine
        .generate(&character1, &character2, cli.turns, scenario.as_deref())
        .await;

    let fallbacks = dialogue.fallback_count();
    let interrupted = dialogue.interrupted;
    let session = DialogueSession::new(character1, character2, dialogue.turns);

    let store = FileSessionStore::new(config.output_dir).await?;
    let saved = store.save(&session).await?;

    println!("对话已保存到: {}", saved.record.display());
    println!("文本格式对话已保存到: {}", saved.transcript.display());
    if fallbacks > 0 {
        warn!(fallbacks, "Some turns used fallback lines");
        println!(
            "共 {} 句对话，其中 {fallbacks} 句为备用台词",
            session.turns.len()
        );
    }
    if interrupted {
        println!("对话生成提前结束，已保存已生成的部分。");
    }
    println!("对话生成完成！");

    Ok(())
}
