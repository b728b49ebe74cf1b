//! Session Module
//!
//! Tracks whether a connecting client has proven knowledge of the shared
//! admin password. Sessions live in a pluggable key-value store keyed by
//! an opaque token; the default store is in-memory.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Server-side session record. A fresh session is always unauthenticated;
/// the flag is only ever set after a successful password check.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub authenticated: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            authenticated: false,
            created_at: Utc::now(),
        }
    }
}

/// Reported auth state for a session, as returned by `GET /api/session`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub requires_password: bool,
    pub authenticated: bool,
}

/// Key-value session storage. Swappable for a distributed store without
/// touching the gateway pipeline.
pub trait SessionStore: Send + Sync {
    fn get(&self, token: &str) -> Option<Session>;
    fn put(&self, session: Session);
    fn delete(&self, token: &str) -> bool;
}

/// In-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, token: &str) -> Option<Session> {
        self.sessions.read().get(token).cloned()
    }

    fn put(&self, session: Session) {
        self.sessions
            .write()
            .insert(session.token.clone(), session);
    }

    fn delete(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }
}

/// Validates the shared password, issues and tracks session tokens, and
/// terminates sessions. The expected password is injected at construction
/// and never read from ambient state inside request handling.
pub struct SessionAuthenticator {
    password: Option<String>,
    store: Box<dyn SessionStore>,
}

impl SessionAuthenticator {
    pub fn new(password: Option<String>) -> Self {
        Self::with_store(password, Box::new(MemorySessionStore::default()))
    }

    pub fn with_store(password: Option<String>, store: Box<dyn SessionStore>) -> Self {
        Self { password, store }
    }

    /// Whether password auth is enforced at all.
    pub fn requires_password(&self) -> bool {
        self.password.is_some()
    }

    /// Look up an existing session by token.
    pub fn session(&self, token: &str) -> Option<Session> {
        self.store.get(token)
    }

    /// Issue a brand-new anonymous session.
    pub fn open_session(&self) -> Session {
        let session = Session::new();
        self.store.put(session.clone());
        session
    }

    /// Auth state for the given token. When no password is configured,
    /// every request counts as authenticated.
    pub fn status(&self, token: &str) -> SessionStatus {
        let requires_password = self.requires_password();
        let authenticated = if requires_password {
            self.store
                .get(token)
                .map(|s| s.authenticated)
                .unwrap_or(false)
        } else {
            true
        };
        SessionStatus {
            requires_password,
            authenticated,
        }
    }

    /// Verify the supplied password and mark the session authenticated.
    /// The supplied value comes straight from the request body and must be
    /// a JSON string; anything else is rejected without touching the
    /// session.
    pub fn authenticate(&self, token: &str, supplied: Option<&Value>) -> Result<()> {
        let Some(supplied) = supplied.and_then(Value::as_str) else {
            return Err(Error::MissingPassword);
        };

        let Some(expected) = self.password.as_deref() else {
            return Err(Error::IncorrectPassword);
        };

        if !safe_equal(supplied, expected) {
            warn!("Failed login attempt");
            return Err(Error::IncorrectPassword);
        }

        let mut session = self.store.get(token).unwrap_or_else(|| Session {
            token: token.to_string(),
            authenticated: false,
            created_at: Utc::now(),
        });
        session.authenticated = true;
        self.store.put(session);

        debug!("New Session: {}", token);
        Ok(())
    }

    /// Destroy the session record. Terminating an unknown token is not an
    /// error; it only gets logged.
    pub fn terminate(&self, token: &str) {
        if self.store.delete(token) {
            debug!("Deleted Session: {}", token);
        } else {
            debug!("Terminate for unknown session: {}", token);
        }
    }
}

/// Constant-time string comparison (prevents timing attacks).
fn safe_equal(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}
