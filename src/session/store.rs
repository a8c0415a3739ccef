use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::debug;
use uuid::Uuid;

use super::context::SessionContext;

/// One session, locked for the duration of a request
pub type SharedSession = Arc<tokio::sync::Mutex<SessionContext>>;

/// Idle lifetime used when none is configured
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

impl Entry {
    fn is_idle(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.duration_since(self.last_seen) >= idle_timeout
    }
}

/// Server-side registry of browser sessions keyed by cookie id
///
/// The outer lock is only held to look up or insert; each session has its own
/// async lock so concurrent requests for different sessions never wait on
/// each other. Sessions untouched for longer than the idle timeout are
/// dropped on the next insert or lookup.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Live session for `id`; refreshes its idle clock
    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions
            .get(id)
            .is_some_and(|entry| entry.is_idle(now, self.idle_timeout))
        {
            debug!("Session {id} expired after {:?} idle", self.idle_timeout);
            sessions.remove(id);
            return None;
        }
        let entry = sessions.get_mut(id)?;
        entry.last_seen = now;
        Some(Arc::clone(&entry.session))
    }

    /// Register a freshly bootstrapped session under its own id
    pub fn insert(&self, context: SessionContext) -> SharedSession {
        let id = context.id();
        let shared = Arc::new(tokio::sync::Mutex::new(context));
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Self::retain_active(&mut sessions, now, self.idle_timeout);
        sessions.insert(
            id,
            Entry {
                session: Arc::clone(&shared),
                last_seen: now,
            },
        );
        shared
    }

    pub fn remove(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .map(|entry| entry.session)
    }

    /// Drop every idle session, returning how many were removed
    pub fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Self::retain_active(&mut sessions, Instant::now(), self.idle_timeout)
    }

    fn retain_active(
        sessions: &mut HashMap<Uuid, Entry>,
        now: Instant,
        idle_timeout: Duration,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_idle(now, idle_timeout));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {evicted} idle session(s)");
        }
        evicted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
