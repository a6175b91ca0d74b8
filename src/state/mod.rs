pub mod commits;
pub mod config;
pub mod deals;

use crate::auth::sessions::SessionTable;
use crate::auth::{AuthError, AuthSession, IdentityProvider, SupabaseAuth, TokenSource};
use crate::config_api::{ConfigApi, HttpConfigApi};
use crate::settings::Settings;
use crate::store::{DealStore, SupabaseStore};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

pub use commits::CommitQueue;
pub use config::ConfigState;
pub use deals::DealsState;

/// Locks `m`, recovering the data if a previous holder panicked.
pub fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Everything one signed-in browser owns.
pub struct UserSession {
    auth: Mutex<AuthSession>,
    pub deals: Mutex<DealsState>,
    pub config: Mutex<ConfigState>,
    pub commits: CommitQueue,
}

impl UserSession {
    pub fn new(auth: AuthSession) -> Self {
        Self {
            auth: Mutex::new(auth),
            deals: Mutex::new(DealsState::new()),
            config: Mutex::new(ConfigState::new()),
            commits: CommitQueue::new(),
        }
    }

    pub fn email(&self) -> String {
        lock(&self.auth).email.clone()
    }

    pub fn auth_snapshot(&self) -> AuthSession {
        lock(&self.auth).clone()
    }
}

impl TokenSource for UserSession {
    fn bearer(&self) -> Option<String> {
        Some(lock(&self.auth).access_token.clone())
    }
}

/// Shared services plus the table of browser sessions.
pub struct App {
    pub store: Arc<dyn DealStore>,
    pub config_api: Arc<dyn ConfigApi>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: SessionTable<UserSession>,
}

impl App {
    pub fn new(
        store: Arc<dyn DealStore>,
        config_api: Arc<dyn ConfigApi>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            config_api,
            identity,
            sessions: SessionTable::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.http_timeout)
            .build()?;

        Ok(Self::new(
            Arc::new(SupabaseStore::new(
                &settings.supabase_url,
                &settings.supabase_anon_key,
                client.clone(),
            )),
            Arc::new(HttpConfigApi::new(&settings.config_api_url, client.clone())),
            Arc::new(SupabaseAuth::new(
                &settings.supabase_url,
                &settings.supabase_anon_key,
                client,
            )),
        ))
    }

    /// Signs in with the identity provider and returns the new cookie token.
    pub fn sign_in(&self, email: &str, password: &str, now: i64) -> Result<String, AuthError> {
        let auth = self.identity.sign_in(email.trim(), password, now)?;
        info!(email = %auth.email, "signed in");
        Ok(self.sessions.create(UserSession::new(auth), now))
    }

    /// Looks up the session behind a cookie token, refreshing its tokens when due.
    pub fn session(&self, raw_token: &str, now: i64) -> Option<Arc<UserSession>> {
        let session = self.sessions.load(raw_token, now)?;
        self.ensure_fresh(&session, now);
        Some(session)
    }

    fn ensure_fresh(&self, session: &UserSession, now: i64) {
        let current = session.auth_snapshot();
        if !current.needs_refresh(now) {
            return;
        }
        match self.identity.refresh(&current, now) {
            Ok(fresh) => *lock(&session.auth) = fresh,
            Err(e) => warn!(email = %current.email, error = %e, "token refresh failed"),
        }
    }

    pub fn sign_out(&self, raw_token: &str) {
        if let Some(session) = self.sessions.revoke(raw_token) {
            if let Err(e) = self.identity.sign_out(&session.auth_snapshot()) {
                warn!(error = %e, "remote sign-out failed");
            }
        }
    }
}
