use axum::Json;
use axum::extract::{Form, State};
use axum::response::{Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::templates::{ChatPage, Notice};
use crate::{AppState, Error, Result, SESSION_COOKIE};

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub input: String,
}

#[derive(Deserialize)]
pub struct CredentialForm {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub turn: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct TurnEntry {
    pub index: usize,
    pub role: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: Option<Uuid>,
    pub turns: Vec<TurnEntry>,
}

pub async fn index(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Response) {
    let (jar, session) = state.session_for(jar).await;
    let session = session.lock().await;
    (jar, ChatPage::new(&session).into_html())
}

/// Submit one user message from the page form.
pub async fn chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ChatForm>,
) -> (CookieJar, Response) {
    let (jar, session) = state.session_for(jar).await;
    let mut session = session.lock().await;

    // Empty submissions are a no-op, same as an untouched input box.
    if form.input.trim().is_empty() {
        return (jar, ChatPage::new(&session).into_html());
    }

    debug!("[{}] Message: {}", session.id, form.input);
    let notice = match state.gateway.process_turn(&mut session, &form.input).await {
        Ok(turn) => {
            info!("[{}] Completed turn {}", session.id, turn.turn_number);
            None
        }
        Err(e) => {
            warn!("[{}] Turn failed: {e}", session.id);
            Some(Notice::from_error(&e))
        }
    };

    (jar, ChatPage::new(&session).with_notice(notice).into_html())
}

pub async fn credential(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialForm>,
) -> (CookieJar, Response) {
    let (jar, session) = state.session_for(jar).await;
    let mut session = session.lock().await;

    session.set_credential(form.api_key.trim());
    let notice = if session.credential().is_empty() {
        Notice::info("API key cleared.")
    } else {
        Notice::info("API key saved.")
    };
    info!("[{}] Credential updated", session.id);

    (
        jar,
        ChatPage::new(&session).with_notice(Some(notice)).into_html(),
    )
}

pub async fn summarize(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Response) {
    let (jar, session) = state.session_for(jar).await;
    let session = session.lock().await;

    let page = match session.summarize() {
        Ok(summary) => ChatPage::new(&session).with_summary(summary),
        Err(e) => ChatPage::new(&session).with_notice(Some(Notice::from_error(&e))),
    };

    (jar, page.into_html())
}

/// Drop the session and its credential, then start over with a fresh page.
pub async fn reset(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some((id, _)) = state.existing_session(&jar).await {
        state.store.remove(&id).await;
    }

    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), Redirect::to("/"))
}

pub async fn api_chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ChatRequest>,
) -> (CookieJar, Result<Json<ChatResponse>>) {
    if request.message.trim().is_empty() {
        return (
            jar,
            Err(Error::InvalidRequest("message must not be empty".into())),
        );
    }

    let (jar, session) = state.session_for(jar).await;
    let mut session = session.lock().await;
    if let Some(api_key) = request.api_key.as_deref().map(str::trim)
        && !api_key.is_empty()
    {
        session.set_credential(api_key);
    }

    let result = match state
        .gateway
        .process_turn(&mut session, &request.message)
        .await
    {
        Ok(turn) => Ok(Json(ChatResponse {
            reply: turn.reply,
            turn: turn.turn_number,
        })),
        Err(e) => {
            warn!("[{}] Turn failed: {e}", session.id);
            Err(Error::from(e))
        }
    };

    (jar, result)
}

pub async fn api_summary(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SummaryResponse>> {
    let Some((_, session)) = state.existing_session(&jar).await else {
        return Err(chatrs_core::ChatError::NoConversation.into());
    };

    let summary = session.lock().await.summarize()?;
    Ok(Json(SummaryResponse { summary }))
}

pub async fn api_transcript(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<TranscriptResponse> {
    let Some((id, session)) = state.existing_session(&jar).await else {
        return Json(TranscriptResponse {
            session_id: None,
            turns: Vec::new(),
        });
    };

    let session = session.lock().await;
    let turns = session
        .turns()
        .map(|turn| TurnEntry {
            index: turn.index,
            role: turn.role.as_str(),
            text: turn.text.to_string(),
        })
        .collect();

    Json(TranscriptResponse {
        session_id: Some(id),
        turns,
    })
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.store.len().await,
    }))
}
