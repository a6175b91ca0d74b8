// errors.rs
use crate::auth::AuthError;
use crate::config_api::ConfigApiError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (data service, APIs).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Data service error: {0}")]
    Store(#[from] StoreError),

    #[error("Sign-in error: {0}")]
    Auth(#[from] AuthError),

    #[error("Configuration service error: {0}")]
    ConfigApi(#[from] ConfigApiError),

    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::Store(_) | ServerError::Auth(_) | ServerError::ConfigApi(_) => 502,
            ServerError::InternalError => 500,
        }
    }
}
