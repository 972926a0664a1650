//! Ambient session store
//!
//! In-memory token -> session map with an idle-age window refreshed on
//! every request. Session creation (login) happens outside the workflow
//! engine; this store only resolves, refreshes, and expires tokens.
//! Every state-changing request must echo the session's CSRF token.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::Rng;
use rand::distr::Alphanumeric;

const TOKEN_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: i64,
    pub csrf_token: String,
    pub last_seen: Instant,
}

pub struct SessionStore {
    sessions: DashMap<String, Session>,
    idle_age: Duration,
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

impl SessionStore {
    pub fn new(idle_age: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_age,
        }
    }

    /// Open a session for a user; returns (session token, CSRF token).
    pub fn create(&self, user_id: i64) -> (String, String) {
        let token = random_token();
        let csrf_token = random_token();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id,
                csrf_token: csrf_token.clone(),
                last_seen: Instant::now(),
            },
        );
        (token, csrf_token)
    }

    /// Resolve a token, refreshing its idle timer. Expired sessions are
    /// dropped and resolve to `None`.
    pub fn touch(&self, token: &str) -> Option<Session> {
        let expired = match self.sessions.get_mut(token) {
            Some(mut entry) => {
                if entry.last_seen.elapsed() > self.idle_age {
                    true
                } else {
                    entry.last_seen = Instant::now();
                    return Some(entry.clone());
                }
            }
            None => return None,
        };

        if expired {
            self.sessions.remove(token);
        }
        None
    }

    /// Remaining idle time of a session without refreshing it.
    pub fn remaining(&self, token: &str) -> Option<Duration> {
        let entry = self.sessions.get(token)?;
        self.idle_age.checked_sub(entry.last_seen.elapsed())
    }

    pub fn remove(&self, token: &str) {
        self.sessions.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_touch() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (token, csrf) = store.create(42);
        let session = store.touch(&token).unwrap();
        assert_eq!(session.user_id, 42);
        assert_eq!(session.csrf_token, csrf);
        assert!(store.touch("unknown").is_none());
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let store = SessionStore::new(Duration::ZERO);
        let (token, _) = store.create(42);
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.touch(&token).is_none());
        // and it stays gone
        assert!(store.remaining(&token).is_none());
    }

    #[test]
    fn test_tokens_are_distinct() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (a, _) = store.create(1);
        let (b, _) = store.create(1);
        assert_ne!(a, b);
    }
}
