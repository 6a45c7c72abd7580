//! Application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use handlebars::Handlebars;
use kaabil_core::{SessionState, Tutor};
use tracing::debug;
use uuid::Uuid;

use crate::error::WebResult;
use crate::page;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Slot {
    session: SessionState,
    touched: Instant,
}

/// In-memory session slots keyed by the session cookie.
///
/// Handlers check a session out, run one action on their own copy and commit it back,
/// so the lock is never held across a provider call. Idle sessions are not kept, slots
/// untouched for longer than the TTL are dropped, and when the store is full the least
/// recently touched slot makes room.
#[derive(Clone)]
pub struct SessionStore {
    slots: Arc<Mutex<HashMap<Uuid, Slot>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            slots: Arc::default(),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn checkout(&self, id: Uuid) -> SessionState {
        self.checkout_at(id, Instant::now())
    }

    pub fn commit(&self, id: Uuid, session: SessionState) {
        self.commit_at(id, session, Instant::now())
    }

    fn checkout_at(&self, id: Uuid, now: Instant) -> SessionState {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_stale(&mut slots, now);
        slots
            .get(&id)
            .map(|slot| slot.session.clone())
            .unwrap_or_default()
    }

    fn commit_at(&self, id: Uuid, session: SessionState, now: Instant) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        self.evict_stale(&mut slots, now);

        if session.is_idle() {
            slots.remove(&id);
            return;
        }

        if !slots.contains_key(&id) && slots.len() >= self.max_sessions {
            if let Some(oldest) = slots
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(id, _)| *id)
            {
                debug!(session = %oldest, "Session store full, dropping oldest session");
                slots.remove(&oldest);
            }
        }

        slots.insert(
            id,
            Slot {
                session,
                touched: now,
            },
        );
    }

    fn evict_stale(&self, slots: &mut HashMap<Uuid, Slot>, now: Instant) {
        let before = slots.len();
        slots.retain(|_, slot| now.saturating_duration_since(slot.touched) < self.ttl);
        let evicted = before - slots.len();
        if evicted > 0 {
            debug!(evicted, "Dropped abandoned sessions");
        }
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub tutor: Arc<Tutor>,
    pub sessions: SessionStore,
    pub pages: Arc<Handlebars<'static>>,
}

impl AppState {
    pub fn new(tutor: Tutor, sessions: SessionStore) -> WebResult<Self> {
        Ok(Self {
            tutor: Arc::new(tutor),
            sessions,
            pages: Arc::new(page::registry()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(question: &str) -> SessionState {
        let mut session = SessionState::new();
        session.set_question(question.into(), String::new());
        session
    }

    #[test]
    fn idle_sessions_are_dropped_on_commit() {
        let store = SessionStore::default();
        let id = Uuid::new_v4();
        assert!(store.checkout(id).is_idle());

        store.commit(id, pending("Q"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.checkout(id).question(), Some("Q"));

        let mut session = store.checkout(id);
        session.clear();
        store.commit(id, session);
        assert!(store.is_empty());
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.commit(a, pending("for a"));

        assert!(store.checkout(b).is_idle());
        assert_eq!(store.checkout(a).question(), Some("for a"));
    }

    #[test]
    fn abandoned_sessions_expire() {
        let store = SessionStore::new(Duration::from_secs(60), 100);
        let start = Instant::now();
        let (abandoned, active) = (Uuid::new_v4(), Uuid::new_v4());

        store.commit_at(abandoned, pending("never answered"), start);
        store.commit_at(active, pending("still here"), start + Duration::from_secs(30));

        let later = start + Duration::from_secs(61);
        assert!(store.checkout_at(abandoned, later).is_idle());
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.checkout_at(active, later).question(),
            Some("still here")
        );
    }

    #[test]
    fn full_store_drops_least_recently_touched() {
        let store = SessionStore::new(Duration::from_secs(3600), 2);
        let start = Instant::now();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

        for (i, id) in ids.iter().enumerate() {
            store.commit_at(*id, pending("Q"), start + Duration::from_secs(i as u64));
        }

        let now = start + Duration::from_secs(3);
        assert_eq!(store.len(), 2);
        assert!(store.checkout_at(ids[0], now).is_idle());
        assert!(!store.checkout_at(ids[1], now).is_idle());
        assert!(!store.checkout_at(ids[2], now).is_idle());
    }

    #[test]
    fn recommitting_a_known_session_does_not_evict_others() {
        let store = SessionStore::new(Duration::from_secs(3600), 2);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.commit(a, pending("a"));
        store.commit(b, pending("b"));

        let mut session = store.checkout(a);
        session.submit_answer("answer");
        store.commit(a, session);

        assert_eq!(store.len(), 2);
        assert_eq!(store.checkout(b).question(), Some("b"));
    }
}
