//! Session persistence.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::{SessionError, SessionId, SessionState};

/// Storage for session state, keyed by session id.
///
/// Implementations must be safe for concurrent use by distinct ids.
pub trait SessionStore: Send + Sync {
    /// Load a live session. Unknown and expired ids yield `Ok(None)`.
    fn load(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError>;

    /// Store `state` under `id` for `ttl`.
    fn save(&self, id: &SessionId, state: SessionState, ttl: Duration) -> Result<(), SessionError>;

    /// Forget a session.
    fn remove(&self, id: &SessionId) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: SessionState,
    expires_at: Instant,
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<SessionId, Entry>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored sessions, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError> {
        let now = Instant::now();
        match self.entries.get(id) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.state)),
            Some(_) => {}
        }
        // The read guard is released above; removing while holding it would deadlock.
        self.entries.remove_if(id, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    fn save(&self, id: &SessionId, state: SessionState, ttl: Duration) -> Result<(), SessionError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| SessionError::Store(format!("session ttl of {}s is out of range", ttl.as_secs())))?;
        self.entries.insert(*id, Entry { state, expires_at });
        Ok(())
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        self.entries.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_session_loads_back() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        store
            .save(&id, SessionState::Authenticated, Duration::from_secs(60))
            .unwrap();

        assert_eq!(store.load(&id).unwrap(), Some(SessionState::Authenticated));
        assert_eq!(store.load(&SessionId::generate()).unwrap(), None);
    }

    #[test]
    fn expired_sessions_read_as_absent() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        store
            .save(&id, SessionState::Authenticated, Duration::ZERO)
            .unwrap();

        assert_eq!(store.load(&id).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn purge_drops_only_expired() {
        let store = MemorySessionStore::new();
        let live = SessionId::generate();
        store
            .save(&live, SessionState::Authenticated, Duration::from_secs(60))
            .unwrap();
        store
            .save(&SessionId::generate(), SessionState::Authenticated, Duration::ZERO)
            .unwrap();

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(&live).unwrap(), Some(SessionState::Authenticated));
    }

    #[test]
    fn unrepresentable_ttl_is_an_error() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        let result = store.save(&id, SessionState::Authenticated, Duration::from_secs(u64::MAX));

        assert!(matches!(result, Err(SessionError::Store(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_forgets_session() {
        let store = MemorySessionStore::new();
        let id = SessionId::generate();
        store
            .save(&id, SessionState::Authenticated, Duration::from_secs(60))
            .unwrap();
        store.remove(&id).unwrap();
        assert_eq!(store.load(&id).unwrap(), None);
    }
}
