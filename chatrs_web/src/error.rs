use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatrs_core::ChatError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Template error: {0}")]
    Render(#[from] askama::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Body of a JSON error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl Error {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Chat(ChatError::Authentication(_)) => StatusCode::UNAUTHORIZED,
            Self::Chat(ChatError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            Self::Chat(ChatError::NoConversation) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Render(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Chat(err) => err.code(),
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Render(_) | Self::Io(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "error": ApiError {
                code: self.code().to_string(),
                message: self.to_string(),
            }
        });

        (self.status(), axum::Json(body)).into_response()
    }
}
