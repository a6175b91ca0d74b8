// src/state/config.rs
//
// Read-through view of the configuration API for one browser session.

use crate::auth::TokenSource;
use crate::config_api::{ConfigApi, ConfigApiError};
use crate::domain::{Configuration, ConfigurationVersion};
use crate::forms::{ConfigForm, FieldErrors};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigPage {
    #[default]
    Active,
    History,
    Preview(i64),
    Editor,
}

impl ConfigPage {
    /// Subnav tab the page sits under. Previews open from the history list.
    pub fn tab(self) -> ConfigPage {
        match self {
            ConfigPage::Preview(_) => ConfigPage::History,
            other => other,
        }
    }
}

/// What the configuration screen should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigView {
    /// No configuration exists yet.
    Empty,
    /// A read failed; the page offers a retry.
    Error { message: String },
    /// The authoritative version, editable.
    Active(ConfigurationVersion),
    /// A non-active version, read-only, with an activate action.
    Preview(ConfigurationVersion),
    History { versions: Vec<i64>, active: Option<i64> },
    Editor { form: ConfigForm, errors: FieldErrors },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug)]
pub struct ConfigState {
    active: Option<ConfigurationVersion>,
    preview: Option<ConfigurationVersion>,
    versions: Vec<i64>,
    page: ConfigPage,
    view: ConfigView,
    toast: Option<Toast>,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            active: None,
            preview: None,
            versions: Vec::new(),
            page: ConfigPage::Active,
            view: ConfigView::Empty,
            toast: None,
        }
    }
}

impl ConfigState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_version(&self) -> Option<i64> {
        self.active.as_ref().map(|a| a.version)
    }

    pub fn active_config(&self) -> Option<&Configuration> {
        self.active.as_ref().map(|a| &a.config_data)
    }

    pub fn previewed_version(&self) -> Option<i64> {
        self.preview.as_ref().map(|p| p.version)
    }

    pub fn versions(&self) -> &[i64] {
        &self.versions
    }

    pub fn page(&self) -> ConfigPage {
        self.page
    }

    pub fn view(&self) -> &ConfigView {
        &self.view
    }

    pub fn take_toast(&mut self) -> Option<Toast> {
        self.toast.take()
    }

    fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toast = Some(Toast {
            kind,
            message: message.into(),
        });
    }

    pub fn load_active(&mut self, api: &dyn ConfigApi, auth: &dyn TokenSource) -> &ConfigView {
        self.page = ConfigPage::Active;
        self.view = match api.get_active(auth) {
            Ok(active) => {
                self.active = Some(active.clone());
                ConfigView::Active(active)
            }
            Err(ConfigApiError::NotFound { .. }) => {
                self.active = None;
                ConfigView::Empty
            }
            Err(e) => {
                warn!(status = e.status(), error = %e, "failed to load active configuration");
                ConfigView::Error {
                    message: e.to_string(),
                }
            }
        };
        &self.view
    }

    pub fn load_version_list(&mut self, api: &dyn ConfigApi, auth: &dyn TokenSource) -> &ConfigView {
        self.page = ConfigPage::History;
        self.view = match api.list_versions(auth) {
            Ok(mut versions) => {
                versions.sort_unstable_by(|a, b| b.cmp(a));
                self.versions = versions.clone();
                ConfigView::History {
                    versions,
                    active: self.active_version(),
                }
            }
            Err(e) => {
                warn!(status = e.status(), error = %e, "failed to load version list");
                ConfigView::Error {
                    message: e.to_string(),
                }
            }
        };
        &self.view
    }

    pub fn preview_version(
        &mut self,
        api: &dyn ConfigApi,
        auth: &dyn TokenSource,
        version: i64,
    ) -> &ConfigView {
        self.page = ConfigPage::Preview(version);
        self.view = match api.get_version(auth, version) {
            Ok(found) => {
                self.preview = Some(found.clone());
                if Some(found.version) == self.active_version() {
                    ConfigView::Active(found)
                } else {
                    ConfigView::Preview(found)
                }
            }
            Err(e) => {
                warn!(version, status = e.status(), error = %e, "failed to load configuration version");
                ConfigView::Error {
                    message: e.to_string(),
                }
            }
        };
        &self.view
    }

    /// Makes `version` active. Failures only raise a toast.
    pub fn activate_version(
        &mut self,
        api: &dyn ConfigApi,
        auth: &dyn TokenSource,
        version: i64,
    ) -> bool {
        match api.activate(auth, version) {
            Ok(active) => {
                info!(version = active.version, "configuration version activated");
                self.page = ConfigPage::Active;
                self.active = Some(active.clone());
                self.view = ConfigView::Active(active);
                self.toast(ToastKind::Success, format!("Version {version} is now active!"));
                true
            }
            Err(e) => {
                warn!(version, status = e.status(), error = %e, "activation failed");
                self.toast(ToastKind::Error, e.to_string());
                false
            }
        }
    }

    /// Posts a new configuration; the returned version becomes active.
    ///
    /// On a 422 the editor stays open with the errors attached to their fields.
    pub fn create_config(
        &mut self,
        api: &dyn ConfigApi,
        auth: &dyn TokenSource,
        form: ConfigForm,
    ) -> Option<i64> {
        let config = match form.to_config() {
            Ok(config) => config,
            Err(errors) => {
                self.toast(ToastKind::Error, "Please fix the highlighted fields");
                self.show_editor(form, errors);
                return None;
            }
        };

        match api.create(auth, &config) {
            Ok(created) => {
                let version = created.version;
                info!(version, "configuration version created");
                self.page = ConfigPage::Active;
                self.active = Some(created.clone());
                self.view = ConfigView::Active(created);
                self.toast(ToastKind::Success, format!("Configuration v{version} created!"));
                Some(version)
            }
            Err(ConfigApiError::Validation(details)) => {
                self.toast(ToastKind::Error, "Please fix the validation errors");
                self.show_editor(form, FieldErrors::from_validation(&details));
                None
            }
            Err(e) => {
                warn!(status = e.status(), error = %e, "create configuration failed");
                self.toast(ToastKind::Error, e.to_string());
                self.show_editor(form, FieldErrors::new());
                None
            }
        }
    }

    /// Opens the editor on the active configuration, or a blank one.
    pub fn edit(&mut self) -> &ConfigView {
        let form = self
            .active_config()
            .map(ConfigForm::from_config)
            .unwrap_or_default();
        self.show_editor(form, FieldErrors::new());
        &self.view
    }

    pub fn show_editor(&mut self, form: ConfigForm, errors: FieldErrors) {
        self.page = ConfigPage::Editor;
        self.view = ConfigView::Editor { form, errors };
    }

    pub fn cancel_edit(&mut self, api: &dyn ConfigApi, auth: &dyn TokenSource) -> &ConfigView {
        self.load_active(api, auth)
    }

    pub fn navigate_to(
        &mut self,
        api: &dyn ConfigApi,
        auth: &dyn TokenSource,
        page: ConfigPage,
    ) -> &ConfigView {
        match page {
            ConfigPage::Active => self.load_active(api, auth),
            ConfigPage::History => self.load_version_list(api, auth),
            ConfigPage::Preview(version) => self.preview_version(api, auth, version),
            ConfigPage::Editor => self.edit(),
        }
    }

    /// Re-runs whatever the current page shows.
    pub fn refresh(&mut self, api: &dyn ConfigApi, auth: &dyn TokenSource) -> &ConfigView {
        let page = self.page;
        self.navigate_to(api, auth, page)
    }
}
