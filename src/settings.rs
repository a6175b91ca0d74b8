// src/settings.rs
//
// Runtime settings, read from the environment (a `.env` file is honoured).

use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_CONFIG_API_URL: &str = "/config";
pub const DEFAULT_CONFIG_API_ORIGIN: &str = "http://127.0.0.1:8000";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: String,
    pub max_workers: usize,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Fully resolved base URL of the configuration API, no trailing slash.
    pub config_api_url: String,
    pub http_timeout: Duration,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(SettingsError::Invalid {
                    key: ".env",
                    reason: e.to_string(),
                });
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let supabase_url = get("SUPABASE_URL").ok_or(SettingsError::Missing("SUPABASE_URL"))?;
        let supabase_anon_key =
            get("SUPABASE_ANON_KEY").ok_or(SettingsError::Missing("SUPABASE_ANON_KEY"))?;

        let max_workers = match get("DEALDECK_MAX_WORKERS") {
            Some(v) => v.parse().map_err(|_| SettingsError::Invalid {
                key: "DEALDECK_MAX_WORKERS",
                reason: format!("expected a positive integer, got {v:?}"),
            })?,
            None => 8,
        };

        let timeout_secs: u64 = match get("HTTP_TIMEOUT_SECS") {
            Some(v) => v.parse().map_err(|_| SettingsError::Invalid {
                key: "HTTP_TIMEOUT_SECS",
                reason: format!("expected seconds, got {v:?}"),
            })?,
            None => 30,
        };

        let config_api_url = resolve_api_base(
            &get("CONFIG_API_URL").unwrap_or_else(|| DEFAULT_CONFIG_API_URL.to_string()),
            &get("CONFIG_API_ORIGIN").unwrap_or_else(|| DEFAULT_CONFIG_API_ORIGIN.to_string()),
        )?;

        let mut logging = LoggingConfig::default();
        if let Some(level) = get("LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(format) = get("LOG_FORMAT") {
            logging.format = format;
        }

        Ok(Self {
            bind: get("DEALDECK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            max_workers,
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            config_api_url,
            http_timeout: Duration::from_secs(timeout_secs),
            logging,
        })
    }
}

/// A base path like `/config` is joined onto `origin`; absolute URLs pass through.
fn resolve_api_base(base: &str, origin: &str) -> Result<String, SettingsError> {
    let joined = if base.starts_with('/') {
        let origin = url::Url::parse(origin).map_err(|e| SettingsError::Invalid {
            key: "CONFIG_API_ORIGIN",
            reason: e.to_string(),
        })?;
        origin
            .join(base)
            .map_err(|e| SettingsError::Invalid {
                key: "CONFIG_API_URL",
                reason: e.to_string(),
            })?
            .to_string()
    } else {
        url::Url::parse(base)
            .map_err(|e| SettingsError::Invalid {
                key: "CONFIG_API_URL",
                reason: e.to_string(),
            })?
            .to_string()
    };
    Ok(joined.trim_end_matches('/').to_string())
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber. `RUST_LOG` wins over `level`.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => fmt().json().with_env_filter(filter).init(),
            _ => fmt().with_env_filter(filter).init(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
