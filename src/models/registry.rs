use log::info;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use uuid::Uuid;

use crate::models::session::{Session, SessionPhase};
use crate::models::{ConnectionId, RoomId};

pub type SharedSession = Arc<Mutex<Session>>;

/// A room dropped by [`SessionRegistry::sweep_stale`], with whoever was still seated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweptSession {
    pub id: RoomId,
    pub stranded: Vec<ConnectionId>,
}

/// Locks a room, recovering the guard if a previous holder panicked.
pub fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// All live rooms, keyed by id.
///
/// The map lock is only held for lookups and inserts/removals; each room has
/// its own lock so different rooms never wait on each other. Whenever both are
/// needed the map lock is taken first.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<RoomId, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty room under a fresh id.
    pub fn create(&self) -> RoomId {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = Session::new(id.clone(), rand::random());
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        info!("Created room {} ({} live)", id, sessions.len());
        id
    }

    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub fn delete(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        match sessions.remove(id) {
            Some(session) => {
                lock_session(&session).retire();
                info!("Deleted room {} ({} live)", id, sessions.len());
                true
            }
            None => false,
        }
    }

    /// Deletes the room if nobody is seated in it any more.
    ///
    /// Checked under both locks, so a join racing with the last leave either
    /// lands before the check (and the room stays) or finds the room retired.
    pub fn remove_if_vacant(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let vacant = match sessions.get(id) {
            Some(session) => {
                let mut session = lock_session(session);
                if session.participants().is_empty() {
                    session.retire();
                    true
                } else {
                    false
                }
            }
            None => return false,
        };
        if vacant {
            sessions.remove(id);
            info!("Room {} is empty, removed ({} live)", id, sessions.len());
        }
        vacant
    }

    /// Drops rooms that never got a game going and have been idle for `ttl`.
    ///
    /// Rooms whose lock is busy are skipped until the next sweep.
    pub fn sweep_stale(&self, ttl: Duration) -> Vec<SweptSession> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut swept = Vec::new();
        sessions.retain(|id, session| {
            let Ok(mut session) = session.try_lock() else {
                return true;
            };
            let idle = matches!(session.phase(), SessionPhase::Empty | SessionPhase::Waiting)
                && session.last_activity().elapsed() >= ttl;
            if idle {
                session.retire();
                swept.push(SweptSession {
                    id: id.clone(),
                    stranded: session.member_ids(),
                });
            }
            !idle
        });
        if !swept.is_empty() {
            info!("Swept {} idle rooms ({} live)", swept.len(), sessions.len());
        }
        swept
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
