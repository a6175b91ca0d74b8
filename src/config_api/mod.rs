pub mod http;

use crate::auth::TokenSource;
use crate::domain::{Configuration, ConfigurationVersion};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use http::HttpConfigApi;

/// One step of a validation error location, e.g. `"items"` or `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Index(u64),
    Key(String),
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocSegment::Index(i) => write!(f, "{i}"),
            LocSegment::Key(k) => f.write_str(k),
        }
    }
}

/// A single entry of a 422 response's `detail` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub loc: Vec<LocSegment>,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigApiError {
    #[error("{detail}")]
    NotFound { detail: String },

    #[error("Validation error")]
    Validation(Vec<ValidationError>),

    #[error("{detail}")]
    Status { status: u16, detail: String },

    /// Network or decode failure; reported with status 0.
    #[error("{detail}")]
    Transport { detail: String },
}

impl ConfigApiError {
    pub fn status(&self) -> u16 {
        match self {
            ConfigApiError::NotFound { .. } => 404,
            ConfigApiError::Validation(_) => 422,
            ConfigApiError::Status { status, .. } => *status,
            ConfigApiError::Transport { .. } => 0,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigApiError::NotFound { .. })
    }
}

/// The versioned configuration service.
///
/// Every call takes the caller's token source and reads the bearer at call time.
pub trait ConfigApi: Send + Sync {
    fn get_active(&self, auth: &dyn TokenSource) -> Result<ConfigurationVersion, ConfigApiError>;

    fn list_versions(&self, auth: &dyn TokenSource) -> Result<Vec<i64>, ConfigApiError>;

    fn get_version(
        &self,
        auth: &dyn TokenSource,
        version: i64,
    ) -> Result<ConfigurationVersion, ConfigApiError>;

    fn activate(
        &self,
        auth: &dyn TokenSource,
        version: i64,
    ) -> Result<ConfigurationVersion, ConfigApiError>;

    fn create(
        &self,
        auth: &dyn TokenSource,
        config: &Configuration,
    ) -> Result<ConfigurationVersion, ConfigApiError>;
}
