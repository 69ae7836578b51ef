use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use carrot_types::models::User;

use crate::storage::LocalStorage;

pub const SESSION_KEY: &str = "user_session";

/// A stored login older than this is discarded.
pub const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
    /// Login time in epoch milliseconds.
    pub login_time: i64,
}

impl Session {
    pub fn new(user: User, token: String, now: DateTime<Utc>) -> Self {
        Self {
            user,
            token,
            login_time: now.timestamp_millis(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - self.login_time > SESSION_TTL_MS
    }
}

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<LocalStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        self.storage.set(SESSION_KEY, session)
    }

    /// The stored session if it is still fresh. Expired or unreadable
    /// entries are removed.
    pub fn get(&self, now: DateTime<Utc>) -> Option<Session> {
        let session = match self.storage.get::<Session>(SESSION_KEY) {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                warn!("Discarding unreadable session: {:#}", e);
                self.clear_quietly();
                return None;
            }
        };

        if session.is_expired(now) {
            info!("Session for {} expired", session.user.nickname);
            self.clear_quietly();
            return None;
        }
        Some(session)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove(SESSION_KEY)
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.clear() {
            warn!("Failed to clear session: {:#}", e);
        }
    }
}
