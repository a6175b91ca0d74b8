pub mod sessions;
pub mod supabase;
pub mod token;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use supabase::SupabaseAuth;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("auth request failed: {0}")]
    Network(String),

    #[error("auth service returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Tokens issued by the hosted identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub email: String,
}

impl AuthSession {
    /// Refresh a minute early so a token never expires mid-request.
    pub fn needs_refresh(&self, now: i64) -> bool {
        now >= self.expires_at - 60
    }
}

/// Anything that can hand out the current bearer token.
///
/// Clients call this right before each request instead of caching a header,
/// so a refreshed session is picked up immediately.
pub trait TokenSource {
    fn bearer(&self) -> Option<String>;
}

/// No signed-in user.
pub struct Anonymous;

impl TokenSource for Anonymous {
    fn bearer(&self) -> Option<String> {
        None
    }
}

impl TokenSource for Option<String> {
    fn bearer(&self) -> Option<String> {
        self.clone()
    }
}

pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self, email: &str, password: &str, now: i64) -> Result<AuthSession, AuthError>;

    fn refresh(&self, session: &AuthSession, now: i64) -> Result<AuthSession, AuthError>;

    fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;
}
