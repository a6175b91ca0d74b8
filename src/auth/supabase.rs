// src/auth/supabase.rs
use crate::auth::{AuthError, AuthSession, IdentityProvider};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Password sign-in and token refresh against the hosted auth service.
pub struct SupabaseAuth {
    base_url: String,
    anon_key: String,
    client: Client,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    user: Option<TokenUser>,
}

#[derive(Deserialize)]
struct TokenUser {
    #[serde(default)]
    email: Option<String>,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            client,
        }
    }

    fn token_grant<B: Serialize>(
        &self,
        grant_type: &str,
        body: &B,
        fallback_email: &str,
        now: i64,
    ) -> Result<AuthSession, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type={grant_type}", self.base_url);
        let resp = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 400 || status.as_u16() == 401 {
            return Err(AuthError::InvalidCredentials(error_message(resp)));
        }
        if !status.is_success() {
            return Err(AuthError::Api {
                status: status.as_u16(),
                message: error_message(resp),
            });
        }

        let token: TokenResponse = resp
            .json()
            .map_err(|e| AuthError::Network(format!("bad token response: {e}")))?;

        Ok(AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: now + token.expires_in,
            email: token
                .user
                .and_then(|u| u.email)
                .unwrap_or_else(|| fallback_email.to_string()),
        })
    }
}

impl IdentityProvider for SupabaseAuth {
    fn sign_in(&self, email: &str, password: &str, now: i64) -> Result<AuthSession, AuthError> {
        self.token_grant("password", &PasswordGrant { email, password }, email, now)
    }

    fn refresh(&self, session: &AuthSession, now: i64) -> Result<AuthSession, AuthError> {
        self.token_grant(
            "refresh_token",
            &RefreshGrant {
                refresh_token: &session.refresh_token,
            },
            &session.email,
            now,
        )
    }

    fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(AuthError::Api {
                status: resp.status().as_u16(),
                message: error_message(resp),
            })
        }
    }
}

/// The auth service is not consistent about where it puts the message.
fn error_message(resp: Response) -> String {
    let text = resp.text().unwrap_or_default();
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| if text.is_empty() { "(no body)".to_string() } else { text })
}
