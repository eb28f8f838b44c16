#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Browser front-end: a single chat page plus a small JSON API, with one
//! conversation session per browser cookie.

mod error;
mod handler;
mod server;
mod templates;

pub use error::{ApiError, Error, Result};
pub use handler::{ChatRequest, ChatResponse, SummaryResponse, TranscriptResponse, TurnEntry};
pub use server::{AppState, SESSION_COOKIE, build_router, serve};
pub use templates::{ChatPage, Notice, PAGE_TITLE};
