// src/config_api/http.rs
use crate::auth::TokenSource;
use crate::config_api::{ConfigApi, ConfigApiError, ValidationError};
use crate::domain::{Configuration, ConfigurationVersion};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const VERSION_NOT_FOUND: &str = "Configuration not found for this version.";

/// Blocking client for the configuration REST API.
pub struct HttpConfigApi {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct ValidationBody {
    #[serde(default)]
    detail: Vec<ValidationError>,
}

impl HttpConfigApi {
    /// `base_url` is absolute, e.g. `http://127.0.0.1:8000/config`.
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `req` with a bearer read right now from `auth` and decodes the body.
    ///
    /// `not_found` is the message used when a 404 is meaningful for this call;
    /// `None` means a 404 is just another failure.
    fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        auth: &dyn TokenSource,
        not_found: Option<&str>,
        fallback: &str,
    ) -> Result<T, ConfigApiError> {
        let req = match auth.bearer() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let resp = req.send().map_err(|e| ConfigApiError::Transport {
            detail: e.to_string(),
        })?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "config api response");

        if status == StatusCode::NOT_FOUND {
            if let Some(detail) = not_found {
                return Err(ConfigApiError::NotFound {
                    detail: detail.to_string(),
                });
            }
        }
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body: ValidationBody = decode(resp)?;
            return Err(ConfigApiError::Validation(body.detail));
        }
        if !status.is_success() {
            return Err(ConfigApiError::Status {
                status: status.as_u16(),
                detail: error_detail(resp).unwrap_or_else(|| fallback.to_string()),
            });
        }

        decode(resp)
    }
}

fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ConfigApiError> {
    resp.json::<T>().map_err(|e| ConfigApiError::Transport {
        detail: e.to_string(),
    })
}

/// `detail` from an error body, when it is a plain string.
fn error_detail(resp: Response) -> Option<String> {
    let body: Value = resp.json().ok()?;
    body.get("detail")?.as_str().map(str::to_string)
}

impl ConfigApi for HttpConfigApi {
    fn get_active(&self, auth: &dyn TokenSource) -> Result<ConfigurationVersion, ConfigApiError> {
        self.send(
            self.client.get(self.url("/")),
            auth,
            Some("No active configuration found."),
            "Failed to fetch active configuration",
        )
    }

    fn list_versions(&self, auth: &dyn TokenSource) -> Result<Vec<i64>, ConfigApiError> {
        self.send(
            self.client.get(self.url("/versions")),
            auth,
            None,
            "Failed to fetch versions",
        )
    }

    fn get_version(
        &self,
        auth: &dyn TokenSource,
        version: i64,
    ) -> Result<ConfigurationVersion, ConfigApiError> {
        self.send(
            self.client.get(self.url(&format!("/{version}"))),
            auth,
            Some(VERSION_NOT_FOUND),
            "Failed to fetch configuration",
        )
    }

    fn activate(
        &self,
        auth: &dyn TokenSource,
        version: i64,
    ) -> Result<ConfigurationVersion, ConfigApiError> {
        self.send(
            self.client
                .patch(self.url(&format!("/{version}/activate")))
                .header("Content-Type", "application/json"),
            auth,
            Some(VERSION_NOT_FOUND),
            "Failed to activate configuration",
        )
    }

    fn create(
        &self,
        auth: &dyn TokenSource,
        config: &Configuration,
    ) -> Result<ConfigurationVersion, ConfigApiError> {
        self.send(
            self.client.post(self.url("/")).json(config),
            auth,
            None,
            "Failed to create configuration",
        )
    }
}
