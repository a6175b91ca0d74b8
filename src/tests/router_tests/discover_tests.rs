use crate::domain::DealStatus;
use crate::router::handle;
use crate::tests::utils::{
    body_string, get, location, post_form, sample_deal, test_app, wait_for, FakeConfigApi,
    FakeStore, TestApp,
};

/// Deals 1..=3 priced 10, 20, 30, plus one already saved.
fn seeded() -> (TestApp, String) {
    let store = FakeStore::new();
    for id in 1..=3 {
        store.insert(sample_deal(id, 10.0 * id as f64), DealStatus::New);
    }
    store.insert(sample_deal(9, 99.0), DealStatus::Saved);
    let t = test_app(store, FakeConfigApi::new());
    let cookie = t.sign_in();
    (t, cookie)
}

fn page(t: &TestApp, cookie: &str, uri: &str) -> String {
    let resp = handle(get(uri, Some(cookie)), &t.app).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);
    body_string(resp)
}

#[test]
fn first_visit_loads_new_deals_as_cards() {
    let (t, cookie) = seeded();
    let body = page(&t, &cookie, "/discover?sort=price_asc");

    assert!(body.contains("3 / 3"));
    assert!(body.contains(r#"class="deal-card top" data-id="1""#));
    assert!(body.contains("NOPE"));
    assert!(body.contains("LIKE"));
    assert!(body.contains(r#"data-commit-delay="300""#));
    assert!(!body.contains("Deal 9"));

    // Requests carry the signed-in user's token, not the anon key.
    assert_eq!(t.store.bearers(), vec![Some("access-1".to_string())]);
}

#[test]
fn table_view_lists_rows_in_sort_order() {
    let (t, cookie) = seeded();
    let body = page(&t, &cookie, "/discover?sort=price_desc&view=table");

    let third = body.find("Deal 3").unwrap();
    let first = body.find("Deal 1").unwrap();
    assert!(third < first);
    assert!(body.contains("<table"));
    // No counter outside card mode.
    assert!(!body.contains("deal-counter"));
}

#[test]
fn swipe_past_threshold_saves_top_card() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_asc");

    let resp = handle(
        post_form("/discover/swipe", &[("id", "1"), ("dx", "150")], Some(&cookie)),
        &t.app,
    )
    .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/discover");

    let body = page(&t, &cookie, "/discover");
    assert!(!body.contains("Deal 1<"));
    assert!(body.contains("2 / 3"));

    wait_for(|| t.store.status_of(1) == Some(DealStatus::Saved));
}

#[test]
fn short_swipe_snaps_back_without_update() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_asc");

    handle(
        post_form("/discover/swipe", &[("id", "1"), ("dx", "-50")], Some(&cookie)),
        &t.app,
    )
    .unwrap();

    let body = page(&t, &cookie, "/discover");
    assert!(body.contains("3 / 3"));
    assert!(t.store.updates().is_empty());
}

#[test]
fn forced_left_swipe_deletes_top_card() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_desc");

    handle(post_form("/discover/force", &[("dir", "left")], Some(&cookie)), &t.app).unwrap();

    wait_for(|| t.store.status_of(3) == Some(DealStatus::Deleted));
    let body = page(&t, &cookie, "/discover");
    assert!(body.contains(r#"class="deal-card top" data-id="2""#));
}

#[test]
fn table_action_removes_row_and_commits() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_asc&view=table");

    handle(
        post_form(
            "/discover/action",
            &[("id", "2"), ("status", "deleted")],
            Some(&cookie),
        ),
        &t.app,
    )
    .unwrap();

    let body = page(&t, &cookie, "/discover");
    assert!(!body.contains("Deal 2"));
    wait_for(|| t.store.status_of(2) == Some(DealStatus::Deleted));
}

#[test]
fn action_with_non_terminal_status_is_rejected() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover");

    let err = handle(
        post_form("/discover/action", &[("id", "2"), ("status", "new")], Some(&cookie)),
        &t.app,
    )
    .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[test]
fn failed_commit_keeps_deal_removed_and_offers_retry() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_asc");
    t.store.fail_updates(true);

    handle(
        post_form("/discover/action", &[("id", "1"), ("status", "saved")], Some(&cookie)),
        &t.app,
    )
    .unwrap();

    let session = t.app.sessions.load(cookie.split('=').nth(1).unwrap(), crate::state::now_unix()).unwrap();
    wait_for(|| session.commits.failed().len() == 1);

    let body = page(&t, &cookie, "/discover");
    assert!(body.contains("could not be saved"));
    assert!(body.contains("2 / 3"));
    assert_eq!(t.store.status_of(1), Some(DealStatus::New));

    t.store.fail_updates(false);
    let resp = handle(
        post_form("/commits/retry", &[("back", "/discover")], Some(&cookie)),
        &t.app,
    )
    .unwrap();
    assert_eq!(location(&resp), "/discover");

    wait_for(|| t.store.status_of(1) == Some(DealStatus::Saved));
    wait_for(|| session.commits.failed().is_empty());
}

#[test]
fn failed_commit_stays_hidden_across_reloads() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_asc");
    t.store.fail_updates(true);

    handle(
        post_form("/discover/action", &[("id", "1"), ("status", "saved")], Some(&cookie)),
        &t.app,
    )
    .unwrap();
    let session = t.app.sessions.load(cookie.split('=').nth(1).unwrap(), crate::state::now_unix()).unwrap();
    wait_for(|| session.commits.failed().len() == 1);

    let body = page(&t, &cookie, "/discover?sort=price_desc");
    assert!(!body.contains(r#"data-id="1""#));
    assert!(body.contains("2 / 2"));

    handle(post_form("/discover/refresh", &[], Some(&cookie)), &t.app).unwrap();
    let body = page(&t, &cookie, "/discover");
    assert!(!body.contains(r#"data-id="1""#));
    assert!(body.contains("could not be saved"));
}

#[test]
fn refresh_with_nothing_new_shows_message() {
    let store = FakeStore::new();
    store.insert(sample_deal(1, 5.0), DealStatus::New);
    let t = test_app(store, FakeConfigApi::new());
    let cookie = t.sign_in();
    page(&t, &cookie, "/discover");

    handle(
        post_form("/discover/action", &[("id", "1"), ("status", "deleted")], Some(&cookie)),
        &t.app,
    )
    .unwrap();
    wait_for(|| t.store.status_of(1) == Some(DealStatus::Deleted));

    let resp = handle(post_form("/discover/refresh", &[], Some(&cookie)), &t.app).unwrap();
    assert_eq!(location(&resp), "/discover");

    let body = page(&t, &cookie, "/discover");
    assert!(body.contains("there are no new deals right now"));
    assert!(body.contains("/discover/refresh"));
}

#[test]
fn refresh_picks_up_new_deals() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_asc");
    t.store.insert(sample_deal(4, 1.0), DealStatus::New);

    handle(post_form("/discover/refresh", &[], Some(&cookie)), &t.app).unwrap();
    let body = page(&t, &cookie, "/discover");
    assert!(body.contains("4 / 4"));
    assert!(body.contains(r#"class="deal-card top" data-id="4""#));
}

#[test]
fn failed_load_keeps_previous_cards_and_reports() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_asc");
    t.store.fail_fetches(true);

    let body = page(&t, &cookie, "/discover?sort=price_desc");
    assert!(body.contains("Could not load deals"));
    assert!(body.contains("3 / 3"));
}

#[test]
fn detail_view_save_removes_deal() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover?sort=price_asc");

    let body = page(&t, &cookie, "/discover/detail?id=2");
    assert!(body.contains("Provo, UT"));
    assert!(body.contains("batch-1"));
    assert!(body.contains("https://example.com/listing/2"));

    handle(post_form("/discover/detail/save", &[], Some(&cookie)), &t.app).unwrap();
    wait_for(|| t.store.status_of(2) == Some(DealStatus::Saved));
    let body = page(&t, &cookie, "/discover");
    assert!(body.contains("2 / 3"));
    assert!(!body.contains("role=\"dialog\""));
}

#[test]
fn unknown_detail_is_not_found() {
    let (t, cookie) = seeded();
    page(&t, &cookie, "/discover");
    let err = handle(get("/discover/detail?id=77", Some(&cookie)), &t.app).unwrap_err();
    assert_eq!(err.status(), 404);
}
