//! Session storage for signed-in users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ApiError, Result};

/// Default session lifetime: 30 days
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// The identity attached to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_anonymous: bool,
}

impl SessionUser {
    /// A throwaway identity for visitors who skip OAuth sign-in
    pub fn anonymous(now: DateTime<Utc>) -> Self {
        Self {
            id: format!("anon_{}", uuid::Uuid::new_v4()),
            email: format!("anon_{}@anonymous.local", now.timestamp_millis()),
            name: "Anonymous User".to_string(),
            is_anonymous: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(user: SessionUser) -> Self {
        let now = Utc::now();
        Self {
            token: uuid::Uuid::new_v4().simple().to_string(),
            user,
            created_at: now,
            last_active: now,
        }
    }

    pub fn is_expired(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(max_age)
            .map(|max_age| now - self.last_active > max_age)
            .unwrap_or(false)
    }
}

pub trait SessionStore: Send + Sync {
    /// Live (unexpired) session for `token`
    fn get(&self, token: &str) -> Option<Session>;
    fn insert(&self, session: Session) -> Result<()>;
    fn remove(&self, token: &str) -> bool;
    fn cleanup_expired(&self) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    max_age: Duration,
}

impl InMemorySessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_age,
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(SESSION_MAX_AGE)
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, token: &str) -> Option<Session> {
        self.sessions
            .read()
            .ok()?
            .get(token)
            .filter(|session| !session.is_expired(self.max_age, Utc::now()))
            .cloned()
    }

    fn insert(&self, session: Session) -> Result<()> {
        self.sessions
            .write()
            .map_err(|e| ApiError::Internal(format!("Lock error: {e}")))?
            .insert(session.token.clone(), session);
        Ok(())
    }

    fn remove(&self, token: &str) -> bool {
        self.sessions
            .write()
            .ok()
            .and_then(|mut sessions| sessions.remove(token))
            .is_some()
    }

    fn cleanup_expired(&self) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };

        let now = Utc::now();
        let initial_count = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.max_age, now));
        initial_count - sessions.len()
    }

    fn len(&self) -> usize {
        self.sessions.read().map(|sessions| sessions.len()).unwrap_or(0)
    }
}
