// src/auth/sessions.rs
//
// Browser sessions: the cookie carries a random token, the server keeps
// only its hash next to the per-browser state.

use crate::auth::token::{generate_token_default, hash_token};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const SESSION_COOKIE: &str = "dealdeck_session";
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7; // 7 days

struct Entry<T> {
    value: Arc<T>,
    expires_at: i64,
}

pub struct SessionTable<T> {
    entries: Mutex<HashMap<[u8; 32], Entry<T>>>,
}

impl<T> Default for SessionTable<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> SessionTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` and returns the raw token for the cookie.
    pub fn create(&self, value: T, now: i64) -> String {
        let raw_token = generate_token_default();
        let mut entries = self.lock();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            hash_token(&raw_token),
            Entry {
                value: Arc::new(value),
                expires_at: now + SESSION_TTL_SECS,
            },
        );
        raw_token
    }

    pub fn load(&self, raw_token: &str, now: i64) -> Option<Arc<T>> {
        let entries = self.lock();
        entries
            .get(&hash_token(raw_token))
            .filter(|e| e.expires_at > now)
            .map(|e| Arc::clone(&e.value))
    }

    pub fn revoke(&self, raw_token: &str) -> Option<Arc<T>> {
        self.lock().remove(&hash_token(raw_token)).map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<[u8; 32], Entry<T>>> {
        // A panic while holding the lock leaves the map itself intact.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Pulls our session token out of a `Cookie` header value.
pub fn read_session_cookie(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}

pub fn session_cookie(raw_token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={raw_token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}"
    )
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
