//! Per-user dialog sessions.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use podium_models::{ActionIntent, ActionName, UserId};

/// Speech rate used until the user asks for another.
pub const DEFAULT_VOICE_RATE: f32 = 1.0;

/// One handled message.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub text: String,
    pub action: ActionName,
    /// `None` when nothing was executed.
    pub success: Option<bool>,
}

/// Conversational context for one user.
#[derive(Debug, Clone)]
pub struct DialogSession {
    pub user_id: UserId,
    pub last_action: Option<ActionName>,
    pub last_message: Option<String>,
    /// Set when the previous turn asked the user to confirm or restate.
    pub awaiting_clarification: bool,
    /// Candidate waiting for a yes/no answer.
    pub pending_intent: Option<ActionIntent>,
    pub voice_rate: f32,
    pub history: VecDeque<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    history_limit: usize,
}

impl DialogSession {
    pub fn new(user_id: UserId, history_limit: usize) -> Self {
        Self {
            user_id,
            last_action: None,
            last_message: None,
            awaiting_clarification: false,
            pending_intent: None,
            voice_rate: DEFAULT_VOICE_RATE,
            history: VecDeque::new(),
            created_at: Utc::now(),
            history_limit,
        }
    }

    /// Appends to history, dropping the oldest entries past the limit.
    pub fn record(&mut self, text: &str, action: ActionName, success: Option<bool>) {
        self.last_action = Some(action);
        self.last_message = Some(text.to_string());
        self.history.push_back(HistoryEntry {
            at: Utc::now(),
            text: text.to_string(),
            action,
            success,
        });
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    /// Marks the session as waiting for a clarification answer.
    pub fn request_clarification(&mut self, candidate: Option<ActionIntent>) {
        self.awaiting_clarification = true;
        self.pending_intent = candidate;
    }

    /// Clears the clarification flag and returns the pending candidate.
    pub fn take_clarification(&mut self) -> Option<ActionIntent> {
        let was_waiting = std::mem::take(&mut self.awaiting_clarification);
        let pending = self.pending_intent.take();
        pending.filter(|_| was_waiting)
    }
}

/// Shared handle to one user's session.
pub type SessionHandle = Arc<Mutex<DialogSession>>;

struct Slot {
    session: SessionHandle,
    last_access: Instant,
}

impl Slot {
    /// A turn outside the store holds the handle.
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.session) > 1
    }
}

/// Bounded in-memory session store.
///
/// Sessions idle longer than the TTL are dropped on access, and the least
/// recently used one makes room when the store is full. A session whose
/// handle is still held by a running turn is never dropped, so the store
/// may briefly exceed its capacity.
pub struct DialogSessionStore {
    sessions: Mutex<HashMap<UserId, Slot>>,
    capacity: usize,
    ttl: Duration,
    history_limit: usize,
}

impl DialogSessionStore {
    pub fn new(capacity: usize, ttl: Duration, history_limit: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
            history_limit,
        }
    }

    /// Returns the user's session, creating it on first contact.
    pub async fn get(&self, user_id: UserId) -> SessionHandle {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|_, slot| {
            slot.in_use() || now.duration_since(slot.last_access) <= self.ttl
        });
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "Dropped idle sessions");
        }

        if let Some(slot) = sessions.get_mut(&user_id) {
            slot.last_access = now;
            return slot.session.clone();
        }

        if sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .filter(|(_, slot)| !slot.in_use())
                .min_by_key(|(_, slot)| slot.last_access)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                debug!(user = %id, "Evicting least recently used session");
                sessions.remove(&id);
            }
        }

        let session = Arc::new(Mutex::new(DialogSession::new(user_id, self.history_limit)));
        sessions.insert(
            user_id,
            Slot {
                session: session.clone(),
                last_access: now,
            },
        );
        session
    }

    /// Applies `update` to the user's session.
    pub async fn update<F>(&self, user_id: UserId, update: F)
    where
        F: FnOnce(&mut DialogSession),
    {
        let handle = self.get(user_id).await;
        let mut session = handle.lock().await;
        update(&mut session);
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut session = DialogSession::new(UserId(1), 3);
        for i in 0..5 {
            session.record(&format!("команда {i}"), ActionName::NextSlide, Some(true));
        }

        assert_eq!(session.history.len(), 3);
        assert_eq!(session.history[0].text, "команда 2");
        assert_eq!(session.last_message.as_deref(), Some("команда 4"));
    }

    #[test]
    fn test_clarification_flag_is_one_shot() {
        let mut session = DialogSession::new(UserId(1), 10);
        session.request_clarification(Some(ActionIntent::new(ActionName::Pause, 0.5)));
        assert!(session.awaiting_clarification);

        let pending = session.take_clarification().unwrap();
        assert_eq!(pending.action, ActionName::Pause);
        assert!(!session.awaiting_clarification);
        assert!(session.take_clarification().is_none());
    }

    #[tokio::test]
    async fn test_get_creates_once_and_update_persists() {
        let store = DialogSessionStore::new(10, Duration::from_secs(60), 20);
        store
            .update(UserId(7), |s| s.voice_rate = 0.8)
            .await;

        let session = store.get(UserId(7)).await;
        assert_eq!(session.lock().await.voice_rate, 0.8);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_full_store_evicts_least_recent() {
        let store = DialogSessionStore::new(2, Duration::from_secs(60), 20);
        store.update(UserId(1), |s| s.voice_rate = 0.8).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.update(UserId(2), |s| s.voice_rate = 1.2).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.get(UserId(1)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        store.get(UserId(3)).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get(UserId(1)).await.lock().await.voice_rate, 0.8);
        assert_eq!(
            store.get(UserId(2)).await.lock().await.voice_rate,
            DEFAULT_VOICE_RATE
        );
    }

    #[tokio::test]
    async fn test_full_store_keeps_sessions_in_use() {
        let store = DialogSessionStore::new(1, Duration::from_secs(60), 20);
        let held = store.get(UserId(1)).await;

        store.get(UserId(2)).await;

        assert_eq!(store.len().await, 2);
        assert!(Arc::ptr_eq(&held, &store.get(UserId(1)).await));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_in_use_is_kept() {
        let store = DialogSessionStore::new(10, Duration::from_secs(60), 20);
        let held = store.get(UserId(1)).await;
        held.lock().await.voice_rate = 0.8;

        tokio::time::advance(Duration::from_secs(61)).await;

        let again = store.get(UserId(1)).await;
        assert!(Arc::ptr_eq(&held, &again));
        assert_eq!(again.lock().await.voice_rate, 0.8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let store = DialogSessionStore::new(10, Duration::from_secs(60), 20);
        store.update(UserId(1), |s| s.voice_rate = 0.8).await;

        tokio::time::advance(Duration::from_secs(61)).await;

        let session = store.get(UserId(1)).await;
        assert_eq!(session.lock().await.voice_rate, DEFAULT_VOICE_RATE);
        assert_eq!(store.len().await, 1);
    }
}
