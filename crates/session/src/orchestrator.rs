//! The session orchestrator — one full request/response cycle per turn.
//!
//! A session owns its injected completion path and store for the life of
//! the process (no per-turn reconnection, no globals). Per turn the steps
//! run strictly in sequence, and every failure after the user message is
//! accepted converges on an assistant reply — the persisted log receives
//! exactly one user row and one assistant row per turn.

use crate::context::WindowBuilder;
use crate::repair::Repairer;
use chatling_core::error::{CompletionError, Error};
use chatling_core::{GenerationParams, Message, PersonaConfig, Transcript, TranscriptStore};
use chatling_providers::{classify, ErrorClass, ModelFallback};
use std::sync::Arc;
use tracing::{info, warn};

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Context window size in messages
    pub window_size: usize,
    /// Rows loaded from the persisted log at session start
    pub history_load: usize,
    /// Output-token budget for the truncation-repair continuation call
    pub repair_budget: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            window_size: 10,
            history_load: 15,
            repair_budget: 256,
        }
    }
}

/// One interactive session: a transcript plus the wiring to extend it.
pub struct Session {
    client: ModelFallback,
    store: Arc<dyn TranscriptStore>,
    window: WindowBuilder,
    repairer: Repairer,
    params: GenerationParams,
    transcript: Transcript,
}

impl Session {
    /// Start a session by loading recent history from the persisted log.
    ///
    /// A store failure here is fatal — a session never starts detached
    /// from its log.
    pub async fn start(
        client: ModelFallback,
        store: Arc<dyn TranscriptStore>,
        persona: PersonaConfig,
        params: GenerationParams,
        options: SessionOptions,
    ) -> Result<Self, Error> {
        let history = store.load_recent(options.history_load).await?;
        let transcript = Transcript::from_history(history);
        info!(
            session = %transcript.id,
            loaded = transcript.len(),
            store = store.name(),
            "Session started"
        );

        Ok(Self {
            client,
            store,
            window: WindowBuilder::new(persona, options.window_size),
            repairer: Repairer::new(options.repair_budget),
            params,
            transcript,
        })
    }

    /// The in-memory transcript: loaded history plus this session's turns.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The persona in effect for this session.
    pub fn persona(&self) -> &PersonaConfig {
        self.window.persona()
    }

    /// Handle one user turn and return the assistant's reply text.
    ///
    /// This never returns an error: once the user message is accepted,
    /// every failure path yields one of the persona's fixed replies, which
    /// is persisted as the assistant turn like any other.
    pub async fn turn(&mut self, input: &str) -> String {
        let user = Message::user(input);
        self.persist(&user).await;
        self.transcript.push(user);

        let prompt = self.window.build(&self.transcript);
        let reply = match self.client.generate(&prompt, &self.params).await {
            Ok(text) => {
                self.repairer
                    .repair(&self.client, self.window.persona(), &self.params, text)
                    .await
            }
            Err(e) => self.reply_for_error(&e),
        };

        let assistant = Message::assistant(reply.clone());
        self.persist(&assistant).await;
        self.transcript.push(assistant);

        reply
    }

    /// The fixed persona reply for a completion failure.
    fn reply_for_error(&self, error: &CompletionError) -> String {
        let persona = self.window.persona();
        match classify(error) {
            ErrorClass::Quota => persona.quota_reply.clone(),
            ErrorClass::Empty => persona.empty_reply.clone(),
            ErrorClass::Retryable => persona.failure_reply.clone(),
        }
    }

    /// Best-effort append: a failed write is logged and the turn goes on —
    /// the user still sees the reply even if persistence is down.
    async fn persist(&self, message: &Message) {
        if let Err(e) = self.store.append(message).await {
            warn!(role = %message.role, error = %e, "Persisting message failed, continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingAppendStore, ScriptedBackend, UnreachableStore};
    use chatling_core::Role;
    use chatling_store::InMemoryStore;

    fn persona() -> PersonaConfig {
        PersonaConfig::default()
    }

    async fn session_with(
        backend: Arc<ScriptedBackend>,
        store: Arc<dyn TranscriptStore>,
    ) -> Session {
        Session::start(
            ModelFallback::new(backend, "model-a", "model-b"),
            store,
            persona(),
            GenerationParams::default(),
            SessionOptions::default(),
        )
        .await
        .unwrap()
    }

    // Scenario A: empty log, a greeting, a normal reply.
    #[tokio::test]
    async fn first_turn_on_empty_log() {
        let backend = ScriptedBackend::new(vec![Ok("안녕! 오늘 뭐 했어?".into())]);
        let store = Arc::new(InMemoryStore::new());
        let mut session = session_with(backend.clone(), store.clone()).await;
        assert!(session.transcript().is_empty());

        let reply = session.turn("안녕").await;
        assert_eq!(reply, "안녕! 오늘 뭐 했어?");

        // Exactly one completion call, prompt = persona + the user line.
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].prompt,
            format!("{}\n\nuser: 안녕", persona().system_prompt)
        );

        // Both sides of the exchange are in the transcript and the log.
        assert_eq!(session.transcript().len(), 2);
        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Message::user("안녕"));
        assert_eq!(rows[1], Message::assistant("안녕! 오늘 뭐 했어?"));
    }

    // Scenario B: a 429 means quota — no secondary call, fixed quota reply.
    #[tokio::test]
    async fn quota_error_yields_quota_reply_without_fallback() {
        let backend = ScriptedBackend::new(vec![Err(CompletionError::ApiError {
            status_code: 429,
            message: "rate limit".into(),
        })]);
        let store = Arc::new(InMemoryStore::new());
        let mut session = session_with(backend.clone(), store.clone()).await;

        let reply = session.turn("안녕").await;
        assert_eq!(reply, persona().quota_reply);
        assert_eq!(backend.calls(), 1);

        // The apology is persisted as the assistant turn.
        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].role, Role::Assistant);
        assert_eq!(rows[1].content, persona().quota_reply);
    }

    // Scenario C: a cut-off reply gets exactly one continuation call.
    #[tokio::test]
    async fn truncated_reply_is_repaired_once() {
        let backend = ScriptedBackend::new(vec![
            Ok("오늘 기분 좋".into()),
            Ok("아서 계속 웃었어!".into()),
        ]);
        let store = Arc::new(InMemoryStore::new());
        let mut session = session_with(backend.clone(), store.clone()).await;

        let reply = session.turn("기분 어때?").await;
        assert_eq!(reply, "오늘 기분 좋아서 계속 웃었어!");

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        // The continuation call carries the partial text and the smaller budget.
        assert!(requests[1].prompt.starts_with("오늘 기분 좋"));
        assert_eq!(requests[1].params.max_output_tokens, 256);

        let rows = store.snapshot().await;
        assert_eq!(rows[1].content, "오늘 기분 좋아서 계속 웃었어!");
    }

    #[tokio::test]
    async fn retryable_failure_exhausts_fallback_then_apologizes() {
        let backend = ScriptedBackend::new(vec![
            Err(CompletionError::Network("conn reset".into())),
            Err(CompletionError::Network("conn reset".into())),
        ]);
        let store = Arc::new(InMemoryStore::new());
        let mut session = session_with(backend.clone(), store.clone()).await;

        let reply = session.turn("안녕").await;
        assert_eq!(reply, persona().failure_reply);

        // Primary and secondary were each tried once.
        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].model, "model-a");
        assert_eq!(requests[1].model, "model-b");
    }

    #[tokio::test]
    async fn empty_completion_yields_ask_again_reply() {
        let backend = ScriptedBackend::new(vec![Err(CompletionError::EmptyResponse)]);
        let store = Arc::new(InMemoryStore::new());
        let mut session = session_with(backend.clone(), store.clone()).await;

        let reply = session.turn("...").await;
        assert_eq!(reply, persona().empty_reply);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn loaded_history_feeds_the_window() {
        let backend = ScriptedBackend::new(vec![Ok("기억하지!".into())]);
        let store = Arc::new(InMemoryStore::with_history(vec![
            Message::user("내 고양이 이름은 치즈야"),
            Message::assistant("귀엽다!"),
        ]));
        let mut session = session_with(backend.clone(), store).await;
        assert_eq!(session.transcript().len(), 2);

        session.turn("기억해?").await;
        let prompt = &backend.requests()[0].prompt;
        assert!(prompt.contains("user: 내 고양이 이름은 치즈야"));
        assert!(prompt.contains("assistant: 귀엽다!"));
        assert!(prompt.ends_with("user: 기억해?"));
    }

    #[tokio::test]
    async fn window_size_bounds_the_prompt() {
        let backend = ScriptedBackend::new(vec![Ok("응!".into())]);
        let history: Vec<Message> = (0..12)
            .map(|i| Message::user(format!("옛날 얘기 {i}")))
            .collect();
        let store = Arc::new(InMemoryStore::with_history(history));

        let mut session = Session::start(
            ModelFallback::new(backend.clone(), "model-a", "model-b"),
            store,
            persona(),
            GenerationParams::default(),
            SessionOptions {
                window_size: 5,
                ..SessionOptions::default()
            },
        )
        .await
        .unwrap();

        session.turn("지금 얘기").await;
        let prompt = &backend.requests()[0].prompt;
        // Last 5 of 13 transcript messages: 옛날 얘기 8..=11 plus the new one.
        assert!(!prompt.contains("옛날 얘기 7"));
        assert!(prompt.contains("옛날 얘기 8"));
        assert!(prompt.ends_with("user: 지금 얘기"));
    }

    #[tokio::test]
    async fn append_failure_is_best_effort() {
        let backend = ScriptedBackend::new(vec![Ok("들려!".into())]);
        let mut session = session_with(backend, Arc::new(FailingAppendStore)).await;

        // The store rejects every write, but the user still gets the reply
        // and the transcript invariant holds in memory.
        let reply = session.turn("내 말 들려?").await;
        assert_eq!(reply, "들려!");
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn unreachable_store_is_fatal_at_start() {
        let backend = ScriptedBackend::new(vec![]);
        let result = Session::start(
            ModelFallback::new(backend, "model-a", "model-b"),
            Arc::new(UnreachableStore),
            persona(),
            GenerationParams::default(),
            SessionOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn every_turn_appends_one_user_and_one_assistant_row() {
        let backend = ScriptedBackend::new(vec![
            Ok("첫 번째 답!".into()),
            Err(CompletionError::ApiError {
                status_code: 500,
                message: "boom".into(),
            }),
            Err(CompletionError::Network("still down".into())),
        ]);
        let store = Arc::new(InMemoryStore::new());
        let mut session = session_with(backend, store.clone()).await;

        session.turn("하나").await;
        session.turn("둘").await; // fails on both models → apology persisted

        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].role, Role::User);
        assert_eq!(rows[1].role, Role::Assistant);
        assert_eq!(rows[2].role, Role::User);
        assert_eq!(rows[3].role, Role::Assistant);
        assert_eq!(rows[3].content, persona().failure_reply);
    }
}
