use crate::config_api::ConfigApiError;
use crate::router::handle;
use crate::tests::utils::{
    body_string, get, location, post_form, test_app, FakeConfigApi, FakeStore, TestApp,
};

fn with_versions(n: i64) -> (TestApp, String) {
    let t = test_app(FakeStore::new(), FakeConfigApi::with_versions(n));
    let cookie = t.sign_in();
    (t, cookie)
}

fn page(t: &TestApp, cookie: &str, uri: &str) -> String {
    let resp = handle(get(uri, Some(cookie)), &t.app).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);
    body_string(resp)
}

#[test]
fn active_configuration_is_shown() {
    let (t, cookie) = with_versions(2);
    let body = page(&t, &cookie, "/config");
    assert!(body.contains("Version 2"));
    assert!(body.contains("item 2"));
    assert!(body.contains("$10+"));
    assert_eq!(t.config.bearers(), vec![Some("access-1".to_string())]);
}

#[test]
fn missing_configuration_shows_empty_state() {
    let (t, cookie) = with_versions(0);
    let body = page(&t, &cookie, "/config");
    assert!(body.contains("No configuration yet"));
}

#[test]
fn unreachable_service_offers_retry() {
    let (t, cookie) = with_versions(1);
    t.config.fail_with(ConfigApiError::Transport {
        detail: "connection refused".into(),
    });
    let body = page(&t, &cookie, "/config");
    assert!(body.contains("connection refused"));
    assert!(body.contains("/config/refresh"));
}

#[test]
fn history_lists_newest_first() {
    let (t, cookie) = with_versions(3);
    t.config.shuffle_listing(vec![1, 3, 2]);
    let body = page(&t, &cookie, "/config/history");
    let v3 = body.find("Version 3").unwrap();
    let v2 = body.find("Version 2").unwrap();
    let v1 = body.find("Version 1").unwrap();
    assert!(v3 < v2 && v2 < v1);
    assert!(body.contains("status-badge active"));
}

#[test]
fn preview_and_activate_older_version() {
    let (t, cookie) = with_versions(3);
    page(&t, &cookie, "/config");

    let body = page(&t, &cookie, "/config/version?v=1");
    assert!(body.contains("Activate this version"));
    assert!(body.contains("item 1"));

    let resp = handle(
        post_form("/config/activate", &[("version", "1")], Some(&cookie)),
        &t.app,
    )
    .unwrap();
    assert_eq!(location(&resp), "/config");
    assert_eq!(t.config.active(), Some(1));

    let body = page(&t, &cookie, "/config");
    assert!(body.contains("Version 1 is now active!"));
    assert!(body.contains("item 1"));

    // The toast is shown once.
    let body = page(&t, &cookie, "/config");
    assert!(!body.contains("is now active!"));
}

#[test]
fn retry_on_a_failed_preview_reloads_the_same_version() {
    let (t, cookie) = with_versions(3);
    page(&t, &cookie, "/config");

    t.config.fail_with(ConfigApiError::Transport {
        detail: "connection reset".into(),
    });
    let body = page(&t, &cookie, "/config/version?v=1");
    assert!(body.contains("connection reset"));
    assert!(body.contains("/config/refresh"));

    t.config.recover();
    let body = page(&t, &cookie, "/config/refresh");
    assert!(body.contains("Activate this version"));
    assert!(body.contains("item 1"));
    assert!(!body.contains("item 3"));
}

#[test]
fn activating_missing_version_toasts_and_stays() {
    let (t, cookie) = with_versions(2);
    page(&t, &cookie, "/config");

    let resp = handle(
        post_form("/config/activate", &[("version", "42")], Some(&cookie)),
        &t.app,
    )
    .unwrap();
    assert_eq!(location(&resp), "/config/version?v=42");
    assert_eq!(t.config.active(), Some(2));
}

#[test]
fn editor_is_prefilled_from_active() {
    let (t, cookie) = with_versions(1);
    let body = page(&t, &cookie, "/config/editor");
    assert!(body.contains(r#"name="item-name-0" value="item 1""#));
    assert!(body.contains("UT, ID"));
}

#[test]
fn saving_editor_creates_next_version() {
    let (t, cookie) = with_versions(7);
    page(&t, &cookie, "/config/editor");

    let resp = handle(
        post_form(
            "/config/editor",
            &[
                ("allowed_states", "ut"),
                ("facebook", "{}"),
                ("craigslist", ""),
                ("ebay", ""),
                ("item-name-0", "Amp"),
                ("item-min-price-0", "25"),
                ("op", "save"),
            ],
            Some(&cookie),
        ),
        &t.app,
    )
    .unwrap();
    assert_eq!(location(&resp), "/config");
    assert_eq!(t.config.active(), Some(8));

    let body = page(&t, &cookie, "/config");
    assert!(body.contains("Configuration v8 created!"));
    assert!(body.contains("Version 8"));
}

#[test]
fn validation_errors_stay_in_the_editor() {
    let (t, cookie) = with_versions(1);

    let resp = handle(
        post_form(
            "/config/editor",
            &[("item-name-0", "Amp"), ("item-name-1", ""), ("op", "save")],
            Some(&cookie),
        ),
        &t.app,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Please fix the validation errors"));
    assert!(body.contains(r#"id="item-name-1-error""#));
    assert!(!body.contains(r#"id="item-name-0-error""#));
    assert_eq!(t.config.version_numbers(), vec![1]);
}

#[test]
fn malformed_json_is_caught_before_the_service() {
    let (t, cookie) = with_versions(1);

    let body = body_string(
        handle(
            post_form(
                "/config/editor",
                &[("ebay", "{broken"), ("item-name-0", "Amp"), ("op", "save")],
                Some(&cookie),
            ),
            &t.app,
        )
        .unwrap(),
    );
    assert!(body.contains(r#"id="ebay-error""#));
    assert_eq!(t.config.create_calls(), 0);
}

#[test]
fn add_and_remove_items_rerender_editor() {
    let (t, cookie) = with_versions(1);

    let body = body_string(
        handle(
            post_form(
                "/config/editor",
                &[("item-name-0", "Amp"), ("op", "add-item")],
                Some(&cookie),
            ),
            &t.app,
        )
        .unwrap(),
    );
    assert!(body.contains(r#"name="item-name-1""#));

    let body = body_string(
        handle(
            post_form(
                "/config/editor",
                &[("item-name-0", "Amp"), ("item-name-1", "TV"), ("op", "remove-item-0")],
                Some(&cookie),
            ),
            &t.app,
        )
        .unwrap(),
    );
    assert!(body.contains(r#"name="item-name-0" value="TV""#));
    assert!(!body.contains(r#"name="item-name-1""#));
    assert_eq!(t.config.create_calls(), 0);
}

#[test]
fn cancel_returns_to_active_view() {
    let (t, cookie) = with_versions(2);
    page(&t, &cookie, "/config/editor");
    let body = body_string(
        handle(post_form("/config/editor/cancel", &[], Some(&cookie)), &t.app).unwrap(),
    );
    assert!(body.contains("Version 2"));
    assert!(!body.contains("config-editor"));
}
