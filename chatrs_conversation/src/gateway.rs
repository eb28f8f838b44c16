//! Completion gateway: turns user input into replies for a session.

use chatrs_core::{ChatError, CompletionProvider, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::handle::{ConversationHandle, GenerationSettings};
use crate::session::ConversationSession;

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Model reply, verbatim
    pub reply: String,
    /// 1-based number of this exchange within the session
    pub turn_number: usize,
}

/// Sends turns to the completion endpoint on behalf of sessions.
///
/// The gateway itself is stateless; every piece of conversation state lives
/// in the [`ConversationSession`] passed in.
pub struct CompletionGateway<P = Arc<dyn CompletionProvider>>
where
    P: Send + Sync,
{
    provider: P,
    settings: GenerationSettings,
}

impl<P> CompletionGateway<P>
where
    P: CompletionProvider + Send + Sync,
{
    pub const fn new(provider: P, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the model's reply to `user_text` and advance the session's summary.
    ///
    /// The first successful call opens the session's conversation handle,
    /// bound to the session credential. A session whose credential has been
    /// cleared is refused even after that. A failure leaves the session
    /// exactly as it was. The transcript is not touched.
    pub async fn respond(
        &self,
        session: &mut ConversationSession,
        user_text: &str,
    ) -> Result<String> {
        if session.credential.is_empty() {
            return Err(ChatError::authentication("No API key provided"));
        }

        if let Some(handle) = session.conversation.handle_mut() {
            let reply = handle.predict(&self.provider, user_text).await?;
            session.touch();
            return Ok(reply);
        }

        let mut handle = ConversationHandle::new(session.credential.clone(), self.settings.clone());
        let reply = handle.predict(&self.provider, user_text).await?;

        info!(
            "Opened conversation {} for session {} (model {})",
            handle.id(),
            session.id,
            self.settings.model
        );
        session.conversation.initialize(handle);
        session.touch();

        Ok(reply)
    }

    /// Run one full turn: on success both the user text and the reply are
    /// appended to the transcript; on failure nothing is.
    pub async fn process_turn(
        &self,
        session: &mut ConversationSession,
        user_text: &str,
    ) -> Result<TurnResult> {
        let turn_number = session.turn_count() + 1;
        info!("Processing turn {turn_number} for session: {}", session.id);

        let reply = self.respond(session, user_text).await?;

        session.append_turn(user_text);
        session.append_turn(reply.clone());

        debug!("Turn {turn_number} completed successfully");

        Ok(TurnResult { reply, turn_number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatrs_core::{Completion, CompletionRequest, Credential};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Replies `Reply N` to conversation prompts and `Summary N` to summary
    /// prompts, recording every request.
    #[derive(Default)]
    struct ScriptedProvider {
        requests: Mutex<Vec<CompletionRequest>>,
        fail_replies: AtomicBool,
        fail_summaries: AtomicBool,
        blank_summaries: AtomicBool,
        blank_replies: AtomicBool,
    }

    impl ScriptedProvider {
        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }

        fn conversation_prompts(&self) -> Vec<String> {
            self.requests()
                .into_iter()
                .map(|r| r.prompt)
                .filter(|p| !p.ends_with("New summary:"))
                .collect()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            request: &CompletionRequest,
            credential: &Credential,
        ) -> Result<Completion> {
            if credential.expose() == "sk-bad" {
                return Err(ChatError::authentication("Incorrect API key provided"));
            }

            let count = {
                let mut requests = self
                    .requests
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                requests.push(request.clone());
                requests.len()
            };

            let text = if request.prompt.ends_with("New summary:") {
                if self.fail_summaries.load(Ordering::SeqCst) {
                    return Err(ChatError::upstream("quota exceeded"));
                }
                if self.blank_summaries.load(Ordering::SeqCst) {
                    String::new()
                } else {
                    format!("Summary {count}")
                }
            } else {
                if self.fail_replies.load(Ordering::SeqCst) {
                    return Err(ChatError::upstream("connection reset"));
                }
                if self.blank_replies.load(Ordering::SeqCst) {
                    return Ok(Completion {
                        text: "  \n".to_string(),
                        usage: None,
                    });
                }
                format!(" Reply {count}")
            };

            Ok(Completion { text, usage: None })
        }
    }

    fn gateway() -> CompletionGateway<Arc<ScriptedProvider>> {
        CompletionGateway::new(
            Arc::new(ScriptedProvider::default()),
            GenerationSettings::default(),
        )
    }

    fn session() -> ConversationSession {
        ConversationSession::new().with_credential(Credential::new("sk-test"))
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn second_turn_uses_summary_not_raw_history() {
        let gateway = gateway();
        let mut session = session();

        let first = gateway
            .process_turn(&mut session, "Hello")
            .await
            .expect("First turn should succeed");
        let summary_after_first = session.summarize().expect("Summary should exist");

        let second = gateway
            .process_turn(&mut session, "What is 2+2?")
            .await
            .expect("Second turn should succeed");

        assert_eq!(
            session.transcript(),
            [
                "Hello".to_string(),
                first.reply.clone(),
                "What is 2+2?".to_string(),
                second.reply.clone(),
            ]
        );
        assert_eq!(first.reply, " Reply 1");
        assert_eq!(second.turn_number, 2);

        let prompts = gateway.provider().conversation_prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains(&summary_after_first));
        assert!(!prompts[1].contains("Hello"));
        assert!(prompts[1].ends_with("Human: What is 2+2?\nAI:"));
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn transcript_grows_by_two_per_turn() {
        let gateway = gateway();
        let mut session = session();

        for n in 1..=5 {
            gateway
                .process_turn(&mut session, &format!("Message {n}"))
                .await
                .expect("Turn should succeed");
            assert_eq!(session.message_count(), 2 * n);
        }
        assert_eq!(session.handle().map(ConversationHandle::turns), Some(5));
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn handle_created_once_and_kept() {
        let gateway = gateway();
        let mut session = session();
        assert!(session.handle().is_none());

        gateway
            .respond(&mut session, "Hello")
            .await
            .expect("Turn should succeed");
        let id = session.handle().map(ConversationHandle::id);
        assert!(id.is_some());

        for _ in 0..3 {
            gateway
                .respond(&mut session, "Again")
                .await
                .expect("Turn should succeed");
            assert_eq!(session.handle().map(ConversationHandle::id), id);
        }
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn respond_does_not_touch_transcript() {
        let gateway = gateway();
        let mut session = session();

        let reply = gateway
            .respond(&mut session, "Hello")
            .await
            .expect("Turn should succeed");
        assert_eq!(reply, " Reply 1");
        assert!(session.is_empty());
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn summarize_returns_last_recorded_summary() {
        let gateway = gateway();
        let mut session = session();
        assert_eq!(session.summarize(), Err(ChatError::NoConversation));

        gateway
            .process_turn(&mut session, "Hello")
            .await
            .expect("Turn should succeed");

        let summary = session.summarize().expect("Summary should exist");
        assert_eq!(summary, "Summary 2");
        assert_eq!(
            Some(summary.as_str()),
            session.handle().map(ConversationHandle::summary)
        );
        // Read-only: no extra completion calls.
        let calls = gateway.provider().requests().len();
        let _ = session.summarize();
        assert_eq!(gateway.provider().requests().len(), calls);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn failed_turn_leaves_session_unchanged() {
        let gateway = gateway();
        let mut session = session();

        gateway
            .process_turn(&mut session, "Hello")
            .await
            .expect("First turn should succeed");
        let summary = session.summarize().expect("Summary should exist");

        gateway.provider().fail_replies.store(true, Ordering::SeqCst);
        let result = gateway.process_turn(&mut session, "Still there?").await;

        assert_eq!(result.err(), Some(ChatError::upstream("connection reset")));
        assert_eq!(session.message_count(), 2);
        assert_eq!(session.summarize(), Ok(summary));
    }

    #[tokio::test]
    async fn failed_summary_call_rolls_nothing_forward() {
        let gateway = gateway();
        let mut session = session();
        gateway.provider().fail_summaries.store(true, Ordering::SeqCst);

        let result = gateway.process_turn(&mut session, "Hello").await;

        assert!(matches!(result, Err(ChatError::Upstream(_))));
        assert!(session.is_empty());
        assert!(!session.conversation().is_initialized());
    }

    #[tokio::test]
    async fn rejected_credential_is_authentication_error() {
        let gateway = gateway();
        let mut session = ConversationSession::new().with_credential(Credential::new("sk-bad"));

        let result = gateway.process_turn(&mut session, "Hello").await;

        assert_eq!(
            result.err(),
            Some(ChatError::authentication("Incorrect API key provided"))
        );
        assert_eq!(session.message_count(), 0);
        assert!(session.handle().is_none());
    }

    #[tokio::test]
    async fn missing_credential_fails_without_calling_endpoint() {
        let gateway = gateway();
        let mut session = ConversationSession::new();

        let result = gateway.process_turn(&mut session, "Hello").await;

        assert!(matches!(result, Err(ChatError::Authentication(_))));
        assert!(gateway.provider().requests().is_empty());
        assert!(session.is_empty());
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn fixing_credential_after_failure_opens_conversation() {
        let gateway = gateway();
        let mut session = ConversationSession::new().with_credential(Credential::new("sk-bad"));

        assert!(gateway.process_turn(&mut session, "Hello").await.is_err());

        session.set_credential("sk-good");
        gateway
            .process_turn(&mut session, "Hello")
            .await
            .expect("Turn should succeed with a valid key");

        assert_eq!(session.message_count(), 2);
        assert!(session.conversation().is_initialized());
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn requests_are_deterministic() {
        let gateway = gateway();
        let mut session = session();

        gateway
            .process_turn(&mut session, "Hello")
            .await
            .expect("Turn should succeed");

        let requests = gateway.provider().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.temperature.abs() < f32::EPSILON));
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn blank_summary_still_records_exchange() {
        let gateway = gateway();
        let mut session = session();
        gateway.provider().blank_summaries.store(true, Ordering::SeqCst);

        gateway
            .process_turn(&mut session, "Hello")
            .await
            .expect("Turn should succeed");

        let summary = session.summarize().expect("Summary should exist");
        assert_eq!(summary, "Human: Hello\nAI: Reply 1");
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn cleared_credential_stops_open_conversation() {
        let gateway = gateway();
        let mut session = session();
        gateway
            .process_turn(&mut session, "Hello")
            .await
            .expect("First turn should succeed");
        let calls = gateway.provider().requests().len();

        session.set_credential("");
        let result = gateway.process_turn(&mut session, "Still there?").await;

        assert!(matches!(result, Err(ChatError::Authentication(_))));
        assert_eq!(gateway.provider().requests().len(), calls);
        assert_eq!(session.message_count(), 2);
    }

    #[tokio::test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    async fn teardown_revokes_handle_credential() {
        let gateway = gateway();
        let mut session = session();
        gateway
            .process_turn(&mut session, "Hello")
            .await
            .expect("First turn should succeed");
        let calls = gateway.provider().requests().len();

        session.teardown();
        let result = gateway.process_turn(&mut session, "Still there?").await;
        assert!(matches!(result, Err(ChatError::Authentication(_))));

        // The handle's own copy is gone too, not just the session's.
        let handle = session
            .conversation
            .handle_mut()
            .expect("Handle should survive teardown");
        let direct = handle.predict(gateway.provider(), "Anyone?").await;
        assert!(matches!(direct, Err(ChatError::Authentication(_))));
        assert_eq!(gateway.provider().requests().len(), calls);
    }

    #[tokio::test]
    async fn whitespace_reply_fails_turn() {
        let gateway = gateway();
        let mut session = session();
        gateway.provider().blank_replies.store(true, Ordering::SeqCst);

        let result = gateway.process_turn(&mut session, "Hello").await;

        assert!(matches!(result, Err(ChatError::Upstream(_))));
        assert!(session.is_empty());
        assert!(!session.conversation().is_initialized());
    }
}
