// src/store/supabase.rs
use crate::auth::TokenSource;
use crate::domain::deal::DEAL_COLUMNS;
use crate::domain::{Deal, DealStatus};
use crate::store::{DealStore, StoreError};
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::json;

const TABLE: &str = "deals";

/// PostgREST access to the deals table.
pub struct SupabaseStore {
    base_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseStore {
    pub fn new(base_url: &str, anon_key: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            client,
        }
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url)
    }

    // Signed-in users send their own token; otherwise the anon key doubles as bearer.
    fn authorize(&self, req: RequestBuilder, auth: &dyn TokenSource) -> RequestBuilder {
        let bearer = auth.bearer().unwrap_or_else(|| self.anon_key.clone());
        req.header("apikey", &self.anon_key).bearer_auth(bearer)
    }
}

impl DealStore for SupabaseStore {
    fn fetch_by_status(
        &self,
        auth: &dyn TokenSource,
        status: DealStatus,
    ) -> Result<Vec<Deal>, StoreError> {
        let status_filter = format!("eq.{status}");
        let req = self
            .client
            .get(self.table_url())
            .query(&[("select", DEAL_COLUMNS), ("status", status_filter.as_str())]);

        let resp = self
            .authorize(req, auth)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(StoreError::Api { status, message });
        }

        resp.json::<Vec<Deal>>()
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn update_status(
        &self,
        auth: &dyn TokenSource,
        id: i64,
        status: DealStatus,
    ) -> Result<(), StoreError> {
        let id_filter = format!("eq.{id}");
        let req = self
            .client
            .patch(self.table_url())
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&json!({ "status": status }));

        let resp = self
            .authorize(req, auth)
            .send()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let code = resp.status().as_u16();
            let message = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            Err(StoreError::Api {
                status: code,
                message,
            })
        }
    }
}
