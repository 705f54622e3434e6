/// Session store: per-user sessions with serialized access per key.
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::schema::session::{Session, UserId};

/// Maps user IDs to their sessions, creating a session on first contact.
///
/// The map lock is held only long enough to find or insert a session
/// slot. Each slot has its own lock, so one user's messages are handled
/// one at a time while different users proceed in parallel.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<FxHashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take exclusive access to `user_id`'s session, creating it if needed.
    ///
    /// The guard must be dropped before the same user's next message can
    /// be handled.
    pub async fn checkout(&self, user_id: UserId) -> OwnedMutexGuard<Session> {
        let slot = {
            let mut sessions = self.sessions.lock().await;
            Arc::clone(sessions.entry(user_id).or_insert_with(|| {
                tracing::debug!(user = %user_id, "creating session");
                Arc::new(Mutex::new(Session::new(user_id)))
            }))
        };
        slot.lock_owned().await
    }

    /// A copy of the current session, if the user has ever made contact.
    pub async fn snapshot(&self, user_id: UserId) -> Option<Session> {
        let slot = self.sessions.lock().await.get(&user_id).cloned()?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
