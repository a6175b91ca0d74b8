use crate::domain::{Configuration, ConfigurationVersion, Platform};
use crate::forms::{ConfigForm, FieldErrors, FieldId, ItemForm};
use crate::state::config::{ConfigPage, ConfigView, Toast};
use crate::templates::components::{post_button, toast};
use crate::templates::{desktop_layout, Nav};
use maud::{html, Markup};

pub fn config_page(page: ConfigPage, view: &ConfigView, flash: Option<&Toast>) -> Markup {
    desktop_layout(
        "Configuration",
        Nav::Config,
        html! {
            main class="container" {
                (subnav(page))
                (toast(flash))
                @match view {
                    ConfigView::Empty => (empty()),
                    ConfigView::Error { message } => (error_state(message)),
                    ConfigView::Active(active) => (active_view(active)),
                    ConfigView::Preview(preview) => (preview_view(preview)),
                    ConfigView::History { versions, active } => (history(versions, *active)),
                    ConfigView::Editor { form, errors } => (editor(form, errors)),
                }
            }
        },
    )
}

fn subnav(page: ConfigPage) -> Markup {
    let tabs = [
        (ConfigPage::Active, "/config", "Active"),
        (ConfigPage::History, "/config/history", "History"),
        (ConfigPage::Editor, "/config/editor", "New version"),
    ];
    html! {
        nav class="config-nav" {
            @for (p, href, label) in tabs {
                a.active[p == page.tab()] href=(href) { (label) }
            }
        }
    }
}

fn empty() -> Markup {
    html! {
        div class="empty-state" {
            h2 { "No configuration yet" }
            p { "Create the first version to start collecting deals." }
            a class="btn" href="/config/editor" { "Create configuration" }
        }
    }
}

fn error_state(message: &str) -> Markup {
    html! {
        div class="error-state" role="alert" {
            p { "Could not reach the configuration service: " (message) }
            a class="btn" href="/config/refresh" { "Retry" }
        }
    }
}

fn active_view(active: &ConfigurationVersion) -> Markup {
    html! {
        div class="config-header" {
            h1 { "Version " (active.version) }
            span class="status-badge active" { "Active" }
            a class="btn" href="/config/editor" { "Edit" }
        }
        (summary(&active.config_data))
    }
}

fn preview_view(preview: &ConfigurationVersion) -> Markup {
    html! {
        div class="config-header" {
            h1 { "Version " (preview.version) }
            span class="status-badge" { "Read only" }
            (post_button("/config/activate", &[("version", preview.version.to_string())],
                "Activate this version", "btn"))
            a class="btn-secondary" href="/config/history" { "Back to history" }
        }
        (summary(&preview.config_data))
    }
}

fn summary(config: &Configuration) -> Markup {
    let d = &config.defaults;
    html! {
        section class="config-section" {
            h2 { "Defaults" }
            p {
                strong { "Allowed states: " }
                @if d.allowed_states.is_empty() { "Any" } @else { (d.allowed_states.join(", ")) }
            }
            @for platform in Platform::ALL {
                h3 { (platform.label()) }
                pre class="json" { (pretty(d.platform(platform))) }
            }
        }
        section class="config-section" {
            h2 { "Items (" (config.items.len()) ")" }
            @if config.items.is_empty() {
                p { "No items configured." }
            }
            @for item in &config.items {
                div class="item-rule" {
                    h3 { (item.name) }
                    p class="item-price" { (item.price_range_label()) }
                    @if !item.aliases.is_empty() {
                        p { "Also matches: " (item.aliases.join(", ")) }
                    }
                    @if !item.exclude_keywords.is_empty() {
                        p { "Excludes: " (item.exclude_keywords.join(", ")) }
                    }
                    @if !item.store_options.is_empty() {
                        pre class="json" { (pretty(&item.store_options)) }
                    }
                }
            }
        }
    }
}

fn history(versions: &[i64], active: Option<i64>) -> Markup {
    html! {
        h1 { "Version history" }
        @if versions.is_empty() {
            div class="empty-state" { p { "No versions have been saved yet." } }
        } @else {
            ul class="version-list" {
                @for v in versions {
                    li.active[Some(*v) == active] {
                        a href={ "/config/version?v=" (v) } { "Version " (v) }
                        @if Some(*v) == active {
                            span class="status-badge active" { "Active" }
                        }
                    }
                }
            }
        }
    }
}

fn editor(form: &ConfigForm, errors: &FieldErrors) -> Markup {
    html! {
        h1 { "New configuration version" }
        @if let Some(msg) = errors.get(FieldId::Form) {
            p class="form-error" role="alert" { (msg) }
        }
        form method="post" action="/config/editor" class="config-editor" {
            fieldset {
                legend { "Defaults" }
                (text_field(FieldId::AllowedStates, "Allowed states", &form.allowed_states, errors))
                @for platform in Platform::ALL {
                    (json_field(FieldId::Platform(platform), platform.label(), platform_value(form, platform), errors))
                }
            }
            @for (i, item) in form.items.iter().enumerate() {
                (item_fieldset(i, item, errors))
            }
            div class="editor-actions" {
                button type="submit" name="op" value="add-item" class="btn-secondary" formnovalidate { "Add item" }
                button type="submit" name="op" value="save" class="btn" { "Save as new version" }
            }
        }
        form method="post" action="/config/editor/cancel" class="inline" {
            button type="submit" class="btn-secondary" { "Cancel" }
        }
    }
}

fn item_fieldset(i: usize, item: &ItemForm, errors: &FieldErrors) -> Markup {
    html! {
        fieldset class="item-fieldset" {
            legend { "Item " (i + 1) }
            (text_field(FieldId::ItemName(i), "Name", &item.name, errors))
            (text_field(FieldId::ItemAliases(i), "Aliases", &item.aliases, errors))
            (text_field(FieldId::ItemMinPrice(i), "Min price", &item.min_price, errors))
            (text_field(FieldId::ItemMaxPrice(i), "Max price", &item.max_price, errors))
            (text_field(FieldId::ItemExclude(i), "Exclude keywords", &item.exclude_keywords, errors))
            (json_field(FieldId::ItemStoreOptions(i), "Store options", &item.store_options, errors))
            button type="submit" name="op" value={ "remove-item-" (i) } class="btn-mini btn-nope" formnovalidate {
                "Remove item"
            }
        }
    }
}

fn text_field(field: FieldId, label: &str, value: &str, errors: &FieldErrors) -> Markup {
    let name = field.input_name();
    let error = errors.get(field);
    html! {
        div.field.has-error[error.is_some()] {
            label for=(name) { (label) }
            input id=(name) type="text" name=(name) value=(value)
                aria-describedby=[error.map(|_| field.error_id())];
            (field_error(field, error))
        }
    }
}

fn json_field(field: FieldId, label: &str, value: &str, errors: &FieldErrors) -> Markup {
    let name = field.input_name();
    let error = errors.get(field);
    html! {
        div.field.has-error[error.is_some()] {
            label for=(name) { (label) " (JSON)" }
            textarea id=(name) name=(name) rows="4"
                aria-describedby=[error.map(|_| field.error_id())] { (value) }
            (field_error(field, error))
        }
    }
}

fn field_error(field: FieldId, error: Option<&str>) -> Markup {
    html! {
        @if let Some(msg) = error {
            span class="field-error" id=(field.error_id()) { (msg) }
        }
    }
}

fn platform_value(form: &ConfigForm, platform: Platform) -> &str {
    match platform {
        Platform::Facebook => &form.facebook,
        Platform::Craigslist => &form.craigslist,
        Platform::Ebay => &form.ebay,
    }
}

fn pretty(obj: &serde_json::Map<String, serde_json::Value>) -> String {
    serde_json::to_string_pretty(obj).unwrap_or_default()
}
