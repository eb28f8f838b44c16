use axum::Router;
use axum::routing::{get, post};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chatrs_conversation::CompletionGateway;
use chatrs_session::{SessionStore, SharedSession};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use uuid::Uuid;

use crate::Result;
use crate::handler;

/// Name of the cookie carrying the browser's session id.
pub const SESSION_COOKIE: &str = "chatrs_session";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub gateway: Arc<CompletionGateway>,
    pub secure_cookies: bool,
}

impl AppState {
    #[must_use]
    pub const fn new(store: SessionStore, gateway: Arc<CompletionGateway>) -> Self {
        Self {
            store,
            gateway,
            secure_cookies: false,
        }
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Resolve the browser's session from its cookie, creating one if the
    /// cookie is missing, malformed or stale. The returned jar carries the
    /// cookie for a newly created session.
    pub async fn session_for(&self, jar: CookieJar) -> (CookieJar, SharedSession) {
        let presented = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

        let (id, session) = self.store.get_or_create(presented).await;
        if presented == Some(id) {
            return (jar, session);
        }

        (jar.add(self.session_cookie(id)), session)
    }

    /// Id of the session the cookie points at, if it is still live.
    pub async fn existing_session(&self, jar: &CookieJar) -> Option<(Uuid, SharedSession)> {
        let id = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())?;
        self.store.get(&id).await.map(|session| (id, session))
    }

    fn session_cookie(&self, id: Uuid) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE, id.to_string());
        cookie.set_http_only(true);
        cookie.set_same_site(Some(SameSite::Lax));
        cookie.set_path("/");
        cookie.set_secure(self.secure_cookies);
        cookie
    }
}

#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::index))
        .route("/chat", post(handler::chat))
        .route("/credential", post(handler::credential))
        .route("/summarize", post(handler::summarize))
        .route("/reset", post(handler::reset))
        .route("/api/chat", post(handler::api_chat))
        .route("/api/summary", get(handler::api_summary))
        .route("/api/transcript", get(handler::api_transcript))
        .route("/health", get(handler::health))
        .with_state(state)
}

/// Serve the chat app on `addr` until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Chat server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down chat server");
        })
        .await?;

    Ok(())
}
