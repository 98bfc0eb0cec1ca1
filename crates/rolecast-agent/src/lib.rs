//! Persona synthesis and two-party dialogue generation.
//!
//! [`PersonaSynthesizer`] turns source text into a character persona and
//! [`DialogueEngine`] alternates two personas turn by turn. Both talk to the
//! model through [`LlmClient`] and never surface generation failures: a failed
//! call is replaced by fixed fallback content (see [`fallback`]).

/// Provider backends.
pub mod backends;
/// Model and sampling configuration.
pub mod config;
/// Conversation history sent to the model.
pub mod context;
/// The alternating dialogue loop.
pub mod dialogue;
/// Fallback content and the substitution combinator.
pub mod fallback;
/// Provider-agnostic client.
pub mod llm;
/// Pacing between model calls.
pub mod pacing;
/// Persona synthesis.
pub mod persona;

pub use config::{LlmProvider, ModelConfig, SamplingParams};
pub use context::ConversationHistory;
pub use dialogue::{Dialogue, DialogueEngine, DEFAULT_SCENARIO};
pub use fallback::{FallbackExt, FALLBACK_LINES};
pub use llm::LlmClient;
pub use pacing::{FixedDelay, NoDelay, Pacer};
pub use persona::PersonaSynthesizer;
