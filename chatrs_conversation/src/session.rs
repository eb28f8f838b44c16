//! Per-connection session state.
//!
//! A session holds the transcript shown to the user, the credential the user
//! supplied, and the conversation handle once the first turn succeeds.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use chatrs_core::{ChatError, Credential, Result, Role};

use crate::handle::ConversationHandle;
use crate::state::ConversationState;

/// One transcript entry as the UI renders it.
#[derive(Debug, Clone)]
pub struct TurnView<'a> {
    pub index: usize,
    pub role: Role,
    pub text: &'a str,
}

impl TurnView<'_> {
    /// Stable key per bubble, e.g. `4_user` or `5_ai`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}_{}", self.index, self.role.as_str())
    }
}

/// A conversation session.
///
/// The transcript alternates user and model turns and is append-only.
#[derive(Debug)]
pub struct ConversationSession {
    /// Session identifier
    pub id: Uuid,
    transcript: Vec<String>,
    pub(crate) credential: Credential,
    pub(crate) conversation: ConversationState,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create an empty session: no turns, no handle, empty credential.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            transcript: Vec::new(),
            credential: Credential::empty(),
            conversation: ConversationState::Uninitialized,
            created_at: now,
            updated_at: now,
        }
    }

    /// Start with a credential already in place (e.g. from the environment).
    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    /// Overwrite the credential. Nothing is validated here; a bad value
    /// fails at the next completion call.
    pub fn set_credential(&mut self, value: impl Into<String>) {
        self.credential = Credential::new(value);
        self.touch();
    }

    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Append one turn. Nothing is ever removed.
    pub fn append_turn(&mut self, text: impl Into<String>) {
        self.transcript.push(text.into());
        self.touch();
    }

    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Transcript entries with their index and speaker.
    pub fn turns(&self) -> impl Iterator<Item = TurnView<'_>> {
        self.transcript
            .iter()
            .enumerate()
            .map(|(index, text)| TurnView {
                index,
                role: Role::for_index(index),
                text,
            })
    }

    /// Completed user/model exchanges.
    #[must_use]
    pub const fn turn_count(&self) -> usize {
        self.transcript.len() / 2
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.transcript.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    #[must_use]
    pub const fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    #[must_use]
    pub const fn handle(&self) -> Option<&ConversationHandle> {
        self.conversation.handle()
    }

    /// The running summary, exactly as the handle last recorded it.
    pub fn summarize(&self) -> Result<String> {
        self.conversation
            .handle()
            .map(|handle| handle.summary().to_string())
            .ok_or(ChatError::NoConversation)
    }

    /// Clear the credential, including the copy the handle holds, when the
    /// session goes away.
    pub fn teardown(&mut self) {
        self.credential.clear();
        if let Some(handle) = self.conversation.handle_mut() {
            handle.clear_credential();
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
