use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

/// Failures surfaced to whoever is driving a conversation.
///
/// None of these are fatal: the caller reports them and the session keeps
/// going in the state it had before the failing call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Missing credential, or the endpoint rejected it.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network failure, timeout, quota, non-success status or malformed
    /// response from the completion endpoint.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("No conversation to summarize yet")]
    NoConversation,
}

impl ChatError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Stable machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "AUTHENTICATION_FAILED",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::NoConversation => "NO_CONVERSATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = ChatError::upstream("HTTP 500");
        assert_eq!(err.to_string(), "Upstream error: HTTP 500");
        assert_eq!(err.code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn no_conversation_code() {
        assert_eq!(ChatError::NoConversation.code(), "NO_CONVERSATION");
    }
}
