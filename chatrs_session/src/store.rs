use chatrs_conversation::ConversationSession;
use chatrs_core::Credential;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// A session shared between requests. Holding the lock for a whole turn is
/// what keeps one session to one submission at a time.
pub type SharedSession = Arc<Mutex<ConversationSession>>;

struct Entry {
    session: SharedSession,
    last_seen: DateTime<Utc>,
}

/// Registry of live sessions, keyed by the id the browser presents.
///
/// Sessions idle for longer than the configured timeout are torn down the
/// next time the store is asked for a session; there is no sweeper task.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_timeout: chrono::Duration,
    default_credential: Credential,
}

impl SessionStore {
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout: chrono::Duration::from_std(idle_timeout)
                .unwrap_or(chrono::Duration::MAX),
            default_credential: Credential::empty(),
        }
    }

    /// Credential every new session starts with.
    #[must_use]
    pub fn with_default_credential(mut self, credential: Credential) -> Self {
        self.default_credential = credential;
        self
    }

    /// Return the session for `id`, or create a fresh one under a new id.
    ///
    /// Unknown or expired ids are never reused, so a client cannot pick its
    /// own session id.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SharedSession) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        Self::prune_locked(&mut sessions, now, self.idle_timeout);

        if let Some(id) = id
            && let Some(entry) = sessions.get_mut(&id)
        {
            entry.last_seen = now;
            return (id, Arc::clone(&entry.session));
        }

        let session = ConversationSession::new().with_credential(self.default_credential.clone());
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        sessions.insert(
            id,
            Entry {
                session: Arc::clone(&shared),
                last_seen: now,
            },
        );
        info!("Created session {id} ({} live)", sessions.len());

        (id, shared)
    }

    /// Look up a live session without creating one. A hit counts as
    /// activity and pushes back the idle deadline.
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.get_at(id, Utc::now()).await
    }

    async fn get_at(&self, id: &Uuid, now: DateTime<Utc>) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        Self::prune_locked(&mut sessions, now, self.idle_timeout);

        let entry = sessions.get_mut(id)?;
        entry.last_seen = now;
        Some(Arc::clone(&entry.session))
    }

    /// Tear down and forget a session. Returns whether it existed.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let entry = self.sessions.write().await.remove(id);
        match entry {
            Some(entry) => {
                entry.session.lock().await.teardown();
                info!("Removed session {id}");
                true
            }
            None => false,
        }
    }

    /// Tear down every session idle past the timeout.
    pub async fn prune_expired(&self) -> usize {
        self.prune_expired_at(Utc::now()).await
    }

    async fn prune_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        Self::prune_locked(&mut sessions, now, self.idle_timeout)
    }

    fn prune_locked(
        sessions: &mut HashMap<Uuid, Entry>,
        now: DateTime<Utc>,
        idle_timeout: chrono::Duration,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|id, entry| {
            if now.signed_duration_since(entry.last_seen) <= idle_timeout {
                return true;
            }
            // A session mid-turn is still locked; its credential is zeroized
            // when the last reference drops.
            if let Ok(mut session) = entry.session.try_lock() {
                session.teardown();
            }
            debug!("Expired session {id}");
            false
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!("Pruned {pruned} idle session(s)");
        }
        pruned
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
