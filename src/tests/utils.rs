// src/tests/utils.rs
//
// In-memory stand-ins for the hosted services, plus request helpers.

use crate::auth::sessions::SESSION_COOKIE;
use crate::auth::{AuthError, AuthSession, IdentityProvider, TokenSource};
use crate::config_api::{ConfigApi, ConfigApiError, LocSegment, ValidationError};
use crate::domain::{Configuration, ConfigurationVersion, Deal, DealStatus, Defaults, ItemRule};
use crate::state::{now_unix, App};
use crate::store::{DealStore, StoreError};
use astra::{Body, Request, Response};
use http::Method;
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn sample_deal(id: i64, price: f64) -> Deal {
    Deal {
        id,
        unique_id: Some(format!("fb-{id}")),
        listing_title: Some(format!("Deal {id}")),
        price: Some(price),
        listing_url: Some(format!("https://example.com/listing/{id}")),
        online_store: Some("facebook".into()),
        discovered_at: Some("2024-05-01T12:00:00Z".into()),
        item_name: Some("bike".into()),
        batch_id: Some("batch-1".into()),
        city: Some("Provo".into()),
        state: Some("UT".into()),
    }
}

pub fn sample_config(version: i64) -> Configuration {
    let mut facebook = serde_json::Map::new();
    facebook.insert("radius_km".into(), json!(version * 10));
    Configuration {
        defaults: Defaults {
            allowed_states: vec!["UT".into(), "ID".into()],
            facebook,
            ..Default::default()
        },
        items: vec![ItemRule {
            name: format!("item {version}"),
            aliases: vec!["alias".into()],
            min_price: Some(10.0),
            max_price: None,
            exclude_keywords: vec!["broken".into()],
            store_options: serde_json::Map::new(),
        }],
    }
}

// -- deals store ---------------------------------------------------------------

#[derive(Default)]
struct StoreInner {
    deals: Vec<(Deal, DealStatus)>,
    fail_fetches: bool,
    fail_updates: bool,
    updates: Vec<(i64, DealStatus)>,
    bearers: Vec<Option<String>>,
}

#[derive(Default)]
pub struct FakeStore {
    inner: Mutex<StoreInner>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, deal: Deal, status: DealStatus) {
        self.lock().deals.push((deal, status));
    }

    pub fn fail_fetches(&self, on: bool) {
        self.lock().fail_fetches = on;
    }

    pub fn fail_updates(&self, on: bool) {
        self.lock().fail_updates = on;
    }

    pub fn clear(&self) {
        self.lock().deals.clear();
    }

    pub fn status_of(&self, id: i64) -> Option<DealStatus> {
        self.lock()
            .deals
            .iter()
            .find(|(d, _)| d.id == id)
            .map(|(_, s)| *s)
    }

    /// Successful updates, in the order they landed.
    pub fn updates(&self) -> Vec<(i64, DealStatus)> {
        self.lock().updates.clone()
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.lock().bearers.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap()
    }
}

impl DealStore for FakeStore {
    fn fetch_by_status(
        &self,
        auth: &dyn TokenSource,
        status: DealStatus,
    ) -> Result<Vec<Deal>, StoreError> {
        let mut inner = self.lock();
        inner.bearers.push(auth.bearer());
        if inner.fail_fetches {
            return Err(StoreError::Network("connection reset".into()));
        }
        Ok(inner
            .deals
            .iter()
            .filter(|(_, s)| *s == status)
            .map(|(d, _)| d.clone())
            .collect())
    }

    fn update_status(
        &self,
        auth: &dyn TokenSource,
        id: i64,
        status: DealStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.bearers.push(auth.bearer());
        if inner.fail_updates {
            return Err(StoreError::Api {
                status: 500,
                message: "update rejected".into(),
            });
        }
        for (deal, s) in inner.deals.iter_mut() {
            if deal.id == id {
                *s = status;
            }
        }
        inner.updates.push((id, status));
        Ok(())
    }
}

// -- configuration API ---------------------------------------------------------

#[derive(Default)]
struct ConfigInner {
    versions: BTreeMap<i64, Configuration>,
    active: Option<i64>,
    listing: Option<Vec<i64>>,
    fail: Option<ConfigApiError>,
    create_calls: usize,
    bearers: Vec<Option<String>>,
}

/// Behaves like the configuration service: monotonically increasing versions,
/// one active, 404s with the service's messages, 422 on unnamed items.
#[derive(Default)]
pub struct FakeConfigApi {
    inner: Mutex<ConfigInner>,
}

impl FakeConfigApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Versions `1..=n` built from `sample_config`, the last one active.
    pub fn with_versions(n: i64) -> Self {
        let api = Self::new();
        {
            let mut inner = api.lock();
            for v in 1..=n {
                inner.versions.insert(v, sample_config(v));
            }
            inner.active = (n > 0).then_some(n);
        }
        api
    }

    /// Makes `list_versions` return exactly `order`.
    pub fn shuffle_listing(&self, order: Vec<i64>) {
        self.lock().listing = Some(order);
    }

    /// Every call fails with `err` from now on.
    pub fn fail_with(&self, err: ConfigApiError) {
        self.lock().fail = Some(err);
    }

    /// Undoes `fail_with`.
    pub fn recover(&self) {
        self.lock().fail = None;
    }

    pub fn version_numbers(&self) -> Vec<i64> {
        self.lock().versions.keys().copied().collect()
    }

    pub fn active(&self) -> Option<i64> {
        self.lock().active
    }

    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.lock().bearers.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConfigInner> {
        self.inner.lock().unwrap()
    }

    fn enter(&self, auth: &dyn TokenSource) -> Result<std::sync::MutexGuard<'_, ConfigInner>, ConfigApiError> {
        let mut inner = self.lock();
        inner.bearers.push(auth.bearer());
        if let Some(err) = inner.fail.clone() {
            return Err(err);
        }
        Ok(inner)
    }
}

fn version_not_found() -> ConfigApiError {
    ConfigApiError::NotFound {
        detail: "Configuration not found for this version.".into(),
    }
}

impl ConfigApi for FakeConfigApi {
    fn get_active(&self, auth: &dyn TokenSource) -> Result<ConfigurationVersion, ConfigApiError> {
        let inner = self.enter(auth)?;
        let version = inner.active.ok_or_else(|| ConfigApiError::NotFound {
            detail: "No active configuration found.".into(),
        })?;
        Ok(ConfigurationVersion {
            version,
            config_data: inner.versions[&version].clone(),
        })
    }

    fn list_versions(&self, auth: &dyn TokenSource) -> Result<Vec<i64>, ConfigApiError> {
        let inner = self.enter(auth)?;
        Ok(inner
            .listing
            .clone()
            .unwrap_or_else(|| inner.versions.keys().copied().collect()))
    }

    fn get_version(
        &self,
        auth: &dyn TokenSource,
        version: i64,
    ) -> Result<ConfigurationVersion, ConfigApiError> {
        let inner = self.enter(auth)?;
        let config_data = inner.versions.get(&version).cloned().ok_or_else(version_not_found)?;
        Ok(ConfigurationVersion {
            version,
            config_data,
        })
    }

    fn activate(
        &self,
        auth: &dyn TokenSource,
        version: i64,
    ) -> Result<ConfigurationVersion, ConfigApiError> {
        let mut inner = self.enter(auth)?;
        let config_data = inner.versions.get(&version).cloned().ok_or_else(version_not_found)?;
        inner.active = Some(version);
        Ok(ConfigurationVersion {
            version,
            config_data,
        })
    }

    fn create(
        &self,
        auth: &dyn TokenSource,
        config: &Configuration,
    ) -> Result<ConfigurationVersion, ConfigApiError> {
        let mut inner = self.enter(auth)?;
        inner.create_calls += 1;

        let problems: Vec<ValidationError> = config
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.name.is_empty())
            .map(|(i, _)| ValidationError {
                loc: vec![
                    LocSegment::Key("body".into()),
                    LocSegment::Key("items".into()),
                    LocSegment::Index(i as u64),
                    LocSegment::Key("name".into()),
                ],
                msg: "field required".into(),
            })
            .collect();
        if !problems.is_empty() {
            return Err(ConfigApiError::Validation(problems));
        }

        let version = inner.versions.keys().next_back().copied().unwrap_or(0) + 1;
        inner.versions.insert(version, config.clone());
        inner.active = Some(version);
        Ok(ConfigurationVersion {
            version,
            config_data: config.clone(),
        })
    }
}

// -- identity ------------------------------------------------------------------

pub const TEST_PASSWORD: &str = "hunter2";

#[derive(Default)]
pub struct FakeAuth {
    issued: Mutex<u32>,
    signed_out: Mutex<Vec<String>>,
}

impl FakeAuth {
    pub fn signed_out(&self) -> Vec<String> {
        self.signed_out.lock().unwrap().clone()
    }

    fn issue(&self, email: &str, now: i64) -> AuthSession {
        let mut n = self.issued.lock().unwrap();
        *n += 1;
        AuthSession {
            access_token: format!("access-{n}"),
            refresh_token: format!("refresh-{n}"),
            expires_at: now + 3600,
            email: email.to_string(),
        }
    }
}

impl IdentityProvider for FakeAuth {
    fn sign_in(&self, email: &str, password: &str, now: i64) -> Result<AuthSession, AuthError> {
        if password != TEST_PASSWORD {
            return Err(AuthError::InvalidCredentials("Invalid login credentials".into()));
        }
        Ok(self.issue(email, now))
    }

    fn refresh(&self, session: &AuthSession, now: i64) -> Result<AuthSession, AuthError> {
        Ok(self.issue(&session.email, now))
    }

    fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.signed_out.lock().unwrap().push(session.access_token.clone());
        Ok(())
    }
}

// -- app + requests ------------------------------------------------------------

pub struct TestApp {
    pub app: App,
    pub store: Arc<FakeStore>,
    pub config: Arc<FakeConfigApi>,
    pub auth: Arc<FakeAuth>,
}

pub fn test_app(store: FakeStore, config: FakeConfigApi) -> TestApp {
    let store = Arc::new(store);
    let config = Arc::new(config);
    let auth = Arc::new(FakeAuth::default());
    let app = App::new(store.clone(), config.clone(), auth.clone());
    TestApp {
        app,
        store,
        config,
        auth,
    }
}

impl TestApp {
    /// Signs in and returns a `Cookie` header value.
    pub fn sign_in(&self) -> String {
        let token = self
            .app
            .sign_in("ana@example.com", TEST_PASSWORD, now_unix())
            .unwrap();
        format!("{SESSION_COOKIE}={token}")
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request {
    let mut builder = http::Request::builder().method(Method::GET).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header("Cookie", c);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, pairs: &[(&str, &str)], cookie: Option<&str>) -> Request {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    let mut builder = http::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        builder = builder.header("Cookie", c);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn location(resp: &Response) -> &str {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Polls `cond` until it holds; background commits land on their own thread.
pub fn wait_for(cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("condition not met in time");
}
