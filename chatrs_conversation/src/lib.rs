#![warn(
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

//! Multi-turn conversation with a running summary as context.
//!
//! Each session keeps the full transcript for display, but the model only
//! ever sees a progressively updated summary of the dialogue plus the newest
//! user message, which keeps request size bounded as the conversation grows.
//!
//! # Key Features
//! - Append-only transcript of alternating user/model turns
//! - Conversation handle opened on the first successful turn, never replaced
//! - Failed turns leave no trace in the session
//! - Summary available on demand without another model call

mod gateway;
mod handle;
mod session;
mod state;

pub use gateway::{CompletionGateway, TurnResult};
pub use handle::{ConversationHandle, GenerationSettings};
pub use session::{ConversationSession, TurnView};
pub use state::ConversationState;
