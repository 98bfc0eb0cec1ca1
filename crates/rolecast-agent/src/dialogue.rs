use crate::config::SamplingParams;
use crate::context::ConversationHistory;
use crate::fallback::{fallback_line, FallbackExt};
use crate::llm::LlmClient;
use crate::pacing::Pacer;
use rolecast_core::Message;
use rolecast_session::{Speaker, Turn};
use tracing::{debug, info, warn};

/// Opening scenario used when the caller supplies none.
pub const DEFAULT_SCENARIO: &str = "你们偶然在咖啡店相遇，开始一段对话。";

/// The turns produced by one dialogue run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialogue {
    /// Ordered turns, alternating from [`Speaker::Character1`].
    pub turns: Vec<Turn>,
    /// Set when the loop stopped before producing every requested turn.
    pub interrupted: bool,
}

impl Dialogue {
    /// How many turns hold fallback lines instead of model output.
    pub fn fallback_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_fallback()).count()
    }
}

/// Alternates two personas turn by turn, carrying the full history into
/// every request.
///
/// A failed call never stops the run: the turn gets the fallback line for its
/// index and the loop moves on.
pub struct DialogueEngine {
    llm: LlmClient,
    sampling: SamplingParams,
    pacer: Box<dyn Pacer>,
}

impl DialogueEngine {
    /// Create an engine that samples with `sampling` and waits via `pacer`.
    pub fn new(llm: LlmClient, sampling: SamplingParams, pacer: Box<dyn Pacer>) -> Self {
        Self {
            llm,
            sampling,
            pacer,
        }
    }

    /// Generate `2 * num_turns` alternating turns between the two personas.
    ///
    /// A blank or missing `scenario` falls back to [`DEFAULT_SCENARIO`]. If
    /// pacing fails the run ends early and the turns so far are returned with
    /// [`Dialogue::interrupted`] set.
    pub async fn generate(
        &self,
        character1: &str,
        character2: &str,
        num_turns: u32,
        scenario: Option<&str>,
    ) -> Dialogue {
        let scenario = scenario
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SCENARIO);
        let total = usize::try_from(num_turns)
            .unwrap_or(usize::MAX)
            .saturating_mul(2);

        info!(num_turns, total, "Starting dialogue generation");

        let setup = dialogue_setup(character1, character2, scenario);
        let mut history = ConversationHistory::new();
        let mut speaker = Speaker::Character1;
        let mut turns = Vec::new();
        let mut interrupted = false;

        for index in 0..total {
            history.push(Message::user(turn_cue(index, speaker)));
            let system_prompt = speaker_instruction(&setup, speaker);

            let turn = self
                .llm
                .chat(Some(&system_prompt), history.messages(), &self.sampling)
                .await
                .map(|text| Turn::generated(speaker, text))
                .or_fallback("dialogue turn", || {
                    Turn::fallback(speaker, fallback_line(index))
                });

            debug!(
                turn = index,
                speaker = speaker.number(),
                fallback = turn.is_fallback(),
                history_tokens = history.estimated_tokens(),
                "Turn generated"
            );

            history.push(Message::assistant(turn.content.as_str()));
            turns.push(turn);
            speaker = speaker.other();

            if index + 1 < total {
                if let Err(e) = self.pacer.pause(index).await {
                    warn!(
                        turn = index,
                        error = %e,
                        "Dialogue loop aborted, keeping turns generated so far"
                    );
                    interrupted = true;
                    break;
                }
            }
        }

        let dialogue = Dialogue { turns, interrupted };
        info!(
            turns = dialogue.turns.len(),
            fallbacks = dialogue.fallback_count(),
            interrupted,
            "Dialogue generation finished"
        );
        dialogue
    }
}

/// The fixed context naming both personas and the scenario.
pub fn dialogue_setup(character1: &str, character2: &str, scenario: &str) -> String {
    format!(
        "你将模拟两个角色之间的对话。这些角色是：\n\
         \n\
         角色1: {character1}\n\
         \n\
         角色2: {character2}\n\
         \n\
         初始场景: {scenario}\n\
         \n\
         请生成角色之间的对话，确保每个角色的回应符合其人设。每次只需要生成一个角色的一句话。"
    )
}

/// System prompt for one turn: the setup plus who speaks now.
pub fn speaker_instruction(setup: &str, speaker: Speaker) -> String {
    format!(
        "{setup}\n当前请扮演{}，根据对话历史生成下一句话。",
        speaker.label()
    )
}

/// The user cue appended to history before each request.
pub fn turn_cue(index: usize, speaker: Speaker) -> String {
    if index == 0 {
        format!("请生成{}的第一句对话。", speaker.label())
    } else {
        format!("请根据上下文，生成{}的下一句对话。", speaker.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backends::LlmBackend;
    use crate::fallback::FALLBACK_LINES;
    use crate::pacing::NoDelay;
    use async_trait::async_trait;
    use rolecast_core::{Role, RolecastError, RolecastResult};
    use rolecast_session::TurnSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// A request as the backend saw it.
    #[derive(Debug, Clone)]
    struct Seen {
        system_prompt: String,
        messages: Vec<Message>,
    }

    /// A mock backend that returns a sequence of results, then fails.
    struct MockBackend {
        results: Mutex<Vec<RolecastResult<String>>>,
        seen: Mutex<Vec<Seen>>,
    }

    impl MockBackend {
        fn new(results: Vec<RolecastResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn always_failing() -> Arc<Self> {
            Self::new(Vec::new())
        }

        fn seen(&self) -> Vec<Seen> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn chat(
            &self,
            system_prompt: Option<&str>,
            messages: &[Message],
            _sampling: &SamplingParams,
        ) -> RolecastResult<String> {
            self.seen.lock().unwrap().push(Seen {
                system_prompt: system_prompt.unwrap_or_default().to_string(),
                messages: messages.to_vec(),
            });
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                Err(RolecastError::Http("503 Service Unavailable".into()))
            } else {
                results.remove(0)
            }
        }
    }

    /// Fails on the given pause, counting every call.
    struct FailingPacer {
        fail_at: usize,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Pacer for FailingPacer {
        async fn pause(&self, turn_index: usize) -> RolecastResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if turn_index == self.fail_at {
                Err(RolecastError::Dialogue("rate limiter closed".into()))
            } else {
                Ok(())
            }
        }
    }

    fn engine(backend: Arc<MockBackend>) -> DialogueEngine {
        DialogueEngine::new(
            LlmClient::from_backend(backend),
            SamplingParams::DIALOGUE,
            Box::new(NoDelay),
        )
    }

    #[tokio::test]
    async fn produces_two_turns_per_round() {
        for num_turns in [1u32, 2, 5] {
            let backend = MockBackend::new(
                (0..num_turns * 2).map(|i| Ok(format!("line {i}"))).collect(),
            );
            let dialogue = engine(backend).generate("A", "B", num_turns, None).await;
            assert_eq!(dialogue.turns.len(), num_turns as usize * 2);
            assert!(!dialogue.interrupted);
            assert_eq!(dialogue.fallback_count(), 0);
        }
    }

    #[tokio::test]
    async fn speakers_alternate_from_character1() {
        let dialogue = engine(MockBackend::always_failing())
            .generate("A", "B", 4, None)
            .await;
        assert_eq!(dialogue.turns[0].speaker, Speaker::Character1);
        for pair in dialogue.turns.windows(2) {
            assert_ne!(pair[0].speaker, pair[1].speaker);
        }
    }

    #[tokio::test]
    async fn all_failures_cycle_fallback_lines() {
        let dialogue = engine(MockBackend::always_failing())
            .generate("A", "B", 3, None)
            .await;

        let speakers: Vec<u8> = dialogue.turns.iter().map(|t| t.speaker.number()).collect();
        assert_eq!(speakers, vec![1, 2, 1, 2, 1, 2]);
        for (i, turn) in dialogue.turns.iter().enumerate() {
            assert_eq!(turn.content, FALLBACK_LINES[i]);
            assert_eq!(turn.source, TurnSource::Fallback);
        }
        assert_eq!(dialogue.fallback_count(), 6);
    }

    #[tokio::test]
    async fn fallback_index_wraps_past_list_end() {
        let dialogue = engine(MockBackend::always_failing())
            .generate("A", "B", 5, None)
            .await;
        assert_eq!(dialogue.turns.len(), 10);
        assert_eq!(dialogue.turns[7].content, FALLBACK_LINES[0]);
        assert_eq!(dialogue.turns[9].content, FALLBACK_LINES[2]);
    }

    #[tokio::test]
    async fn mixed_results_keep_position() {
        let backend = MockBackend::new(vec![
            Ok("你好啊。".into()),
            Err(RolecastError::Http("429 Too Many Requests".into())),
            Ok("是啊。".into()),
            Ok("   ".into()),
        ]);
        let dialogue = engine(backend).generate("A", "B", 2, None).await;

        assert_eq!(dialogue.turns[0], Turn::generated(Speaker::Character1, "你好啊。"));
        assert_eq!(dialogue.turns[1], Turn::fallback(Speaker::Character2, FALLBACK_LINES[1]));
        assert_eq!(dialogue.turns[2], Turn::generated(Speaker::Character1, "是啊。"));
        assert_eq!(dialogue.turns[3], Turn::fallback(Speaker::Character2, FALLBACK_LINES[3]));
    }

    #[tokio::test]
    async fn history_accumulates_cues_and_replies() {
        let backend = MockBackend::new(vec![Ok("第一句".into()), Ok("第二句".into())]);
        engine(backend.clone()).generate("A", "B", 2, None).await;

        let seen = backend.seen();
        assert_eq!(seen.len(), 4);
        for (i, request) in seen.iter().enumerate() {
            assert_eq!(request.messages.len(), 2 * i + 1);
        }

        let first = &seen[0].messages;
        assert_eq!(first[0].role, Role::User);
        assert_eq!(first[0].content, "请生成角色1的第一句对话。");

        let last = &seen[3].messages;
        assert_eq!(last[1].role, Role::Assistant);
        assert_eq!(last[1].content, "第一句");
        assert_eq!(last[3].content, "第二句");
        // Turn 2 failed; its fallback line still enters the history.
        assert_eq!(last[5].content, FALLBACK_LINES[2]);
        assert_eq!(last[6].content, "请根据上下文，生成角色2的下一句对话。");
    }

    #[tokio::test]
    async fn system_prompt_fixes_personas_and_speaker() {
        let backend = MockBackend::always_failing();
        engine(backend.clone())
            .generate("角色名称：贾母", "角色名称：刘姥姥", 1, Some("大观园里赏花"))
            .await;

        let seen = backend.seen();
        assert!(seen[0].system_prompt.contains("角色1: 角色名称：贾母"));
        assert!(seen[0].system_prompt.contains("角色2: 角色名称：刘姥姥"));
        assert!(seen[0].system_prompt.contains("初始场景: 大观园里赏花"));
        assert!(seen[0].system_prompt.ends_with("当前请扮演角色1，根据对话历史生成下一句话。"));
        assert!(seen[1].system_prompt.ends_with("当前请扮演角色2，根据对话历史生成下一句话。"));
    }

    #[tokio::test]
    async fn blank_scenario_uses_default() {
        let backend = MockBackend::always_failing();
        engine(backend.clone()).generate("A", "B", 1, Some("  ")).await;
        assert!(backend.seen()[0].system_prompt.contains(DEFAULT_SCENARIO));
    }

    #[tokio::test]
    async fn zero_turns_makes_no_calls() {
        let backend = MockBackend::always_failing();
        let dialogue = engine(backend.clone()).generate("A", "B", 0, None).await;
        assert!(dialogue.turns.is_empty());
        assert!(!dialogue.interrupted);
        assert!(backend.seen().is_empty());
    }

    #[tokio::test]
    async fn pauses_between_turns_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = DialogueEngine::new(
            LlmClient::from_backend(MockBackend::always_failing()),
            SamplingParams::DIALOGUE,
            Box::new(FailingPacer {
                fail_at: usize::MAX,
                calls: calls.clone(),
            }),
        );
        let dialogue = engine.generate("A", "B", 3, None).await;
        assert_eq!(dialogue.turns.len(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn pacing_failure_returns_partial_turns() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = DialogueEngine::new(
            LlmClient::from_backend(MockBackend::always_failing()),
            SamplingParams::DIALOGUE,
            Box::new(FailingPacer { fail_at: 2, calls }),
        );
        let dialogue = engine.generate("A", "B", 3, None).await;
        assert!(dialogue.interrupted);
        assert_eq!(dialogue.turns.len(), 3);
        assert_eq!(dialogue.turns[2].speaker, Speaker::Character1);
    }

    #[tokio::test]
    async fn huge_turn_count_stops_at_pacing_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = DialogueEngine::new(
            LlmClient::from_backend(MockBackend::always_failing()),
            SamplingParams::DIALOGUE,
            Box::new(FailingPacer { fail_at: 2, calls }),
        );
        let dialogue = engine.generate("A", "B", u32::MAX, None).await;
        assert!(dialogue.interrupted);
        assert_eq!(dialogue.turns.len(), 3);
        assert_eq!(dialogue.fallback_count(), 3);
    }

    #[test]
    fn cues_name_the_speaker() {
        assert_eq!(turn_cue(0, Speaker::Character1), "请生成角色1的第一句对话。");
        assert_eq!(
            turn_cue(3, Speaker::Character2),
            "请根据上下文，生成角色2的下一句对话。"
        );
    }
}
