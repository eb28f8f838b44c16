//! The conversation handle: a running summary standing in for the history.

use chatrs_core::prompt::{conversation_prompt, exchange_lines, summary_prompt};
use chatrs_core::{
    ChatError, CompletionProvider, CompletionRequest, Credential, DEFAULT_MODEL, Result,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Generation parameters fixed for the lifetime of a handle.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl GenerationSettings {
    /// Settings with `temperature = 0`, so identical prompts give identical replies.
    pub fn deterministic(model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
            max_tokens,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::deterministic(DEFAULT_MODEL, 256)
    }
}

/// Owns the running summary of one session's dialogue.
///
/// Each completed exchange is folded into the summary, and the summary (not
/// the full transcript) is what the next prompt carries as context. The
/// summary only moves forward: it is replaced after both the reply and the
/// summary completion have succeeded, and never rolled back.
#[derive(Debug)]
pub struct ConversationHandle {
    id: Uuid,
    credential: Credential,
    settings: GenerationSettings,
    summary: String,
    turns: usize,
}

impl ConversationHandle {
    /// Bind a fresh handle to `credential`. Later credential changes on the
    /// session do not affect it, except [`ConversationHandle::clear_credential`].
    #[must_use]
    pub fn new(credential: Credential, settings: GenerationSettings) -> Self {
        Self {
            id: Uuid::now_v7(),
            credential,
            settings,
            summary: String::new(),
            turns: 0,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Number of exchanges folded into the summary.
    #[must_use]
    pub const fn turns(&self) -> usize {
        self.turns
    }

    /// Drop the bound credential; every later `predict` fails.
    pub fn clear_credential(&mut self) {
        self.credential.clear();
    }

    fn request(&self, prompt: String) -> CompletionRequest {
        CompletionRequest {
            prompt,
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Get a reply to `user_input` and fold the exchange into the summary.
    ///
    /// The reply is returned verbatim, except that a whitespace-only reply is
    /// an `Upstream` error: it would render as an empty bubble and fold
    /// nothing into the summary, so the turn is treated as failed and the
    /// user can resend.
    pub async fn predict<P>(&mut self, provider: &P, user_input: &str) -> Result<String>
    where
        P: CompletionProvider + ?Sized,
    {
        if self.credential.is_empty() {
            return Err(ChatError::authentication("No API key provided"));
        }

        let prompt = conversation_prompt(&self.summary, user_input);
        let reply = provider
            .complete(&self.request(prompt), &self.credential)
            .await?
            .text;

        if reply.trim().is_empty() {
            return Err(ChatError::upstream("Empty response from completion endpoint"));
        }

        let new_lines = exchange_lines(user_input, &reply);
        let prompt = summary_prompt(&self.summary, &new_lines);
        let summary = provider
            .complete(&self.request(prompt), &self.credential)
            .await?
            .text;

        self.fold(&summary, &new_lines);
        debug!(
            "Conversation {} summary advanced to turn {} ({} chars)",
            self.id,
            self.turns,
            self.summary.len()
        );

        Ok(reply)
    }

    fn fold(&mut self, summary: &str, new_lines: &str) {
        let summary = summary.trim();
        if summary.is_empty() {
            // Keep the exchange rather than lose it.
            warn!(
                "Conversation {} got a blank summary, appending the exchange instead",
                self.id
            );
            if !self.summary.is_empty() {
                self.summary.push('\n');
            }
            self.summary.push_str(new_lines);
        } else {
            self.summary = summary.to_string();
        }
        self.turns += 1;
    }
}
