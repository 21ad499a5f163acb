//! The single authenticated identity of a running client
//!
//! [`SessionStore`] owns the current [`Session`] and its persisted form. It
//! is created once at process start, restored before the first navigation
//! is evaluated, and lives as long as the client does.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::persistence::{KeyValueStore, KvOp, TOKEN_KEY, USER_KEY};
use crate::role::{Role, User};
use crate::{Result, ScoreguardError};

/// Token plus the user it was issued for
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user,
            established_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .field("established_at", &self.established_at)
            .finish()
    }
}

/// Why a session went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// Explicit logout
    Logout,
    /// The API answered 401
    Unauthorized,
    /// Persisted state could not be restored
    Corrupted,
}

/// Lifecycle notifications for the app shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Established { role: Role },
    Cleared { reason: ClearReason },
}

/// Process-wide session holder
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    persistence: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(persistence: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            current: RwLock::new(None),
            persistence,
            events,
        }
    }

    /// Create a store and restore it in one step
    pub fn restored(persistence: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(persistence);
        store.restore();
        store
    }

    /// Load the persisted pair.
    ///
    /// Returns `None` when nothing usable is stored. Partial or malformed
    /// state is cleared; this never fails.
    pub fn restore(&self) -> Option<Session> {
        match self.read_persisted() {
            Ok(Some(session)) => {
                tracing::info!(
                    "Session restored for {} ({})",
                    session.user.email,
                    session.role()
                );
                *self.current.write() = Some(session.clone());
                Some(session)
            }
            Ok(None) => {
                *self.current.write() = None;
                None
            }
            Err(e) => {
                tracing::warn!("Discarding persisted session: {}", e);
                self.clear_with(ClearReason::Corrupted);
                None
            }
        }
    }

    fn read_persisted(&self) -> Result<Option<Session>> {
        let token = self
            .persistence
            .get(TOKEN_KEY)?
            .filter(|t| !t.is_empty());
        let user = self.persistence.get(USER_KEY)?.filter(|u| !u.is_empty());

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(raw_user)) => {
                let user: User = serde_json::from_str(&raw_user)
                    .map_err(|e| ScoreguardError::MalformedSession(e.to_string()))?;
                Ok(Some(Session::new(user, token)))
            }
            _ => Err(ScoreguardError::MalformedSession(
                "token and user record must be stored together".to_string(),
            )),
        }
    }

    /// Persist a freshly issued identity and make it current
    pub fn establish(&self, user: User, token: impl Into<String>) -> Result<Session> {
        let token = token.into();
        if token.is_empty() {
            return Err(ScoreguardError::MalformedSession(
                "empty token".to_string(),
            ));
        }

        let raw_user = serde_json::to_string(&user)?;
        self.persistence.apply(&[
            KvOp::put(TOKEN_KEY, token.clone()),
            KvOp::put(USER_KEY, raw_user),
        ])?;

        let session = Session::new(user, token);
        let role = session.role();
        *self.current.write() = Some(session.clone());

        tracing::info!("Session established for {} ({})", session.user.email, role);
        let _ = self.events.send(SessionEvent::Established { role });
        Ok(session)
    }

    /// Explicit logout
    pub fn clear(&self) {
        self.clear_with(ClearReason::Logout);
    }

    /// Forced logout after the API rejected the token.
    ///
    /// Persistence is always wiped. Without a current session there is
    /// nothing to log out, so no event is sent.
    pub fn expire(&self) {
        match self.take() {
            Some(session) => {
                tracing::warn!(
                    "Session for {} rejected by the API, logging out",
                    session.user.email
                );
                let _ = self.events.send(SessionEvent::Cleared {
                    reason: ClearReason::Unauthorized,
                });
            }
            None => tracing::debug!("401 without a current session"),
        }
    }

    /// Remove the persisted pair and drop the current session
    pub fn clear_with(&self, reason: ClearReason) {
        if let Some(session) = self.take() {
            tracing::info!("Session cleared for {} ({:?})", session.user.email, reason);
        }
        let _ = self.events.send(SessionEvent::Cleared { reason });
    }

    fn take(&self) -> Option<Session> {
        if let Err(e) = self
            .persistence
            .apply(&[KvOp::remove(TOKEN_KEY), KvOp::remove(USER_KEY)])
        {
            tracing::error!("Failed to remove persisted session: {}", e);
        }
        self.current.write().take()
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.current.read().as_ref().map(|s| s.role())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    /// Receive lifecycle events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &*self.current.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn citizen() -> User {
        User::new("1", "citizen@test.com", Role::Citizen).with_name("John Doe")
    }

    #[test]
    fn test_restore_empty() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        assert!(store.restore().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_establish_then_restore() {
        let backing = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backing.clone());
        store.establish(citizen(), "tok-1").unwrap();
        assert_eq!(store.token().as_deref(), Some("tok-1"));

        let fresh = SessionStore::new(backing);
        let restored = fresh.restore().unwrap();
        assert_eq!(restored.user, citizen());
        assert_eq!(restored.token, "tok-1");
        assert_eq!(fresh.role(), Some(Role::Citizen));
    }

    #[test]
    fn test_restore_clears_partial_state() {
        let backing = Arc::new(MemoryStore::new().with_entry(TOKEN_KEY, "orphan"));
        let store = SessionStore::new(backing.clone());
        assert!(store.restore().is_none());
        assert!(backing.is_empty());
    }

    #[test]
    fn test_restore_clears_malformed_user() {
        let backing = Arc::new(
            MemoryStore::new()
                .with_entry(TOKEN_KEY, "tok")
                .with_entry(USER_KEY, "{not json"),
        );
        let store = SessionStore::new(backing.clone());
        assert!(store.restore().is_none());
        assert!(backing.is_empty());
    }

    #[test]
    fn test_restore_rejects_user_without_valid_role() {
        for raw in [
            r#"{"id":"1","email":"x@y.z"}"#,
            r#"{"id":"1","email":"x@y.z","role":""}"#,
            r#"{"id":"1","email":"x@y.z","role":"superuser"}"#,
            "null",
        ] {
            let backing = Arc::new(
                MemoryStore::new()
                    .with_entry(TOKEN_KEY, "tok")
                    .with_entry(USER_KEY, raw),
            );
            let store = SessionStore::new(backing.clone());
            assert!(store.restore().is_none(), "accepted {}", raw);
            assert!(backing.is_empty(), "left state behind for {}", raw);
        }
    }

    #[test]
    fn test_establish_rejects_empty_token() {
        let backing = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backing.clone());
        assert!(store.establish(citizen(), "").is_err());
        assert!(!store.is_authenticated());
        assert!(backing.is_empty());
    }

    #[test]
    fn test_clear_removes_both_entries() {
        let backing = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backing.clone());
        store.establish(citizen(), "tok").unwrap();
        assert_eq!(backing.len(), 2);

        store.clear();
        assert!(backing.is_empty());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_single_current_session() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        store.establish(citizen(), "tok-a").unwrap();
        store
            .establish(User::new("2", "bank@test.com", Role::Bank), "tok-b")
            .unwrap();
        let current = store.current().unwrap();
        assert_eq!(current.role(), Role::Bank);
        assert_eq!(current.token, "tok-b");
    }

    #[test]
    fn test_events() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        let mut rx = store.subscribe();

        store.establish(citizen(), "tok").unwrap();
        store.expire();

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Established {
                role: Role::Citizen
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Cleared {
                reason: ClearReason::Unauthorized
            }
        );
    }

    #[test]
    fn test_expire_without_session_is_silent() {
        let backing = Arc::new(MemoryStore::new().with_entry(TOKEN_KEY, "stale"));
        let store = SessionStore::new(backing.clone());
        let mut rx = store.subscribe();

        store.expire();

        assert!(rx.try_recv().is_err());
        assert!(backing.is_empty());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(citizen(), "super-secret");
        let printed = format!("{:?}", session);
        assert!(!printed.contains("super-secret"));
    }
}
