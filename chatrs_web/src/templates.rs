//! Chat page template and the view types it renders.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use chatrs_conversation::ConversationSession;
use chatrs_core::{ChatError, Role};
use tracing::warn;

use crate::error::Error;

pub const PAGE_TITLE: &str = "Chat GPT Clone";

/// One message bubble, keyed like `3_ai`.
pub struct Bubble {
    pub key: String,
    pub is_user: bool,
    pub text: String,
}

/// Inline message shown above the input form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: &'static str,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: "info",
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: "error",
            message: message.into(),
        }
    }

    /// User-facing wording for a failed action. The session is unchanged in
    /// every case, so each message invites a retry.
    #[must_use]
    pub fn from_error(err: &ChatError) -> Self {
        match err {
            ChatError::Authentication(detail) => Self::error(format!(
                "Your API key was missing or rejected ({detail}). Enter a valid key in the sidebar and send again."
            )),
            ChatError::Upstream(detail) => Self::error(format!(
                "The model could not answer right now ({detail}). Please try again."
            )),
            ChatError::NoConversation => {
                Self::info("Nothing to summarize yet. Start a conversation first.")
            }
        }
    }
}

#[derive(Template)]
#[template(path = "chat.html", escape = "html")]
pub struct ChatPage {
    pub title: &'static str,
    pub bubbles: Vec<Bubble>,
    pub notice: Option<Notice>,
    pub summary: Option<String>,
    pub has_credential: bool,
    pub turn_count: usize,
}

impl ChatPage {
    #[must_use]
    pub fn new(session: &ConversationSession) -> Self {
        let bubbles = session
            .turns()
            .map(|turn| Bubble {
                key: turn.key(),
                is_user: turn.role == Role::User,
                text: turn.text.to_string(),
            })
            .collect();

        Self {
            title: PAGE_TITLE,
            bubbles,
            notice: None,
            summary: None,
            has_credential: !session.credential().is_empty(),
            turn_count: session.turn_count(),
        }
    }

    #[must_use]
    pub fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice;
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Render to an HTML response, or a JSON 500 if the template fails.
    #[must_use]
    pub fn into_html(self) -> Response {
        match self.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                warn!(error = %e, "failed to render chat template");
                Error::from(e).into_response()
            }
        }
    }
}
