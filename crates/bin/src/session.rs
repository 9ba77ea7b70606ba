//! Session management for web interface
//!
//! Maps session tokens (random UUIDs stored in an HTTP-only cookie) to portal
//! sessions. Sessions are ephemeral and lost on server restart.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use trade_manual::Session;
use uuid::Uuid;

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

/// Shared handle to one browser's session
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory session store
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an authenticated session and return its new token.
    pub async fn create_session(&self, session: Session) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), Arc::new(Mutex::new(session)));
        token
    }

    /// Look up a session by token.
    ///
    /// Only authenticated sessions are returned.
    pub async fn get_session(&self, token: &str) -> Option<SessionHandle> {
        let handle = {
            let sessions = self.sessions.read().await;
            sessions.get(token).cloned()?
        };
        if handle.lock().await.is_authenticated() {
            Some(handle)
        } else {
            None
        }
    }

    pub async fn destroy_session(&self, token: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
