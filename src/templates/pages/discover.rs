use crate::domain::swipe::COMMIT_DELAY;
use crate::domain::{Deal, DealStatus, SortKey, ViewMode};
use crate::state::commits::FailedCommit;
use crate::state::DealsState;
use crate::templates::components::{commit_notice, post_button};
use crate::templates::{desktop_layout, Nav};
use maud::{html, Markup};

pub fn discover_page(state: &DealsState, failed: &[FailedCommit], load_error: Option<&str>) -> Markup {
    desktop_layout(
        "Discover",
        Nav::Discover,
        html! {
            main class="container" {
                (toolbar(state))
                (commit_notice(failed, "/discover"))
                @if let Some(err) = load_error {
                    p class="form-error" role="alert" { "Could not load deals: " (err) }
                }
                @if state.deals().is_empty() {
                    (empty_state(state.message()))
                } @else {
                    @match state.view() {
                        ViewMode::Card => (card_stack(state.deals())),
                        ViewMode::Table => (deal_table(state.deals())),
                    }
                }
                @if let Some(deal) = state.detail() {
                    (detail_overlay(deal))
                }
            }
        },
    )
}

fn toolbar(state: &DealsState) -> Markup {
    let sort = state.sort();
    let view = state.view();
    html! {
        div class="toolbar" {
            form method="get" action="/discover" class="inline sort-form" {
                input type="hidden" name="view" value=(view.as_str());
                label for="sort" { "Sort by" }
                select id="sort" name="sort" data-autosubmit {
                    @for key in SortKey::ALL {
                        option value=(key.as_str()) selected[key == sort] { (key.label()) }
                    }
                }
                noscript { button type="submit" class="btn-secondary" { "Apply" } }
            }
            div class="view-toggle" {
                @for mode in [ViewMode::Card, ViewMode::Table] {
                    a.view-btn.active[mode == view] href={ "/discover?view=" (mode.as_str()) } {
                        @match mode {
                            ViewMode::Card => "Cards",
                            ViewMode::Table => "Table",
                        }
                    }
                }
            }
            @if let Some((remaining, total)) = state.counter() {
                span id="deal-counter" class="counter" { (remaining) " / " (total) }
            }
        }
    }
}

fn empty_state(message: Option<&str>) -> Markup {
    html! {
        div class="empty-state" {
            h2 { "All caught up" }
            @if let Some(msg) = message {
                p class="empty-message" { (msg) }
            } @else {
                p { "You've reviewed every deal. Check again for new ones." }
            }
            (post_button("/discover/refresh", &[], "Refresh", "btn"))
        }
    }
}

/// The stack renders bottom-up so the first deal ends up on top.
fn card_stack(deals: &[Deal]) -> Markup {
    let top_id = deals.first().map(|d| d.id);
    html! {
        div id="card-stack" class="card-stack" data-commit-delay=(COMMIT_DELAY.as_millis()) {
            @for deal in deals.iter().rev() {
                @let is_top = Some(deal.id) == top_id;
                div.deal-card.top[is_top] data-id=(deal.id) {
                    span class="badge badge-nope" { "NOPE" }
                    span class="badge badge-like" { "LIKE" }
                    div class="deal-store" { (deal.store_label()) }
                    div class="deal-price" { (deal.price_label()) }
                    div class="deal-item" { (deal.item_label()) }
                    h3 class="deal-title" { (deal.title_label()) }
                    div class="deal-location" { (deal.location_label()) }
                    @if is_top {
                        a class="deal-details" href={ "/discover/detail?id=" (deal.id) } { "Details" }
                    }
                }
            }
        }
        div class="swipe-actions" {
            (post_button("/discover/force", &[("dir", "left".into())], "✕", "btn-round btn-nope"))
            (post_button("/discover/force", &[("dir", "right".into())], "♥", "btn-round btn-like"))
        }
        form id="swipe-form" method="post" action="/discover/swipe" hidden {
            input type="hidden" name="id" value="";
            input type="hidden" name="dx" value="0";
        }
    }
}

fn deal_table(deals: &[Deal]) -> Markup {
    html! {
        table class="deal-table" {
            thead {
                tr {
                    th { "Item" }
                    th { "Title" }
                    th { "Price" }
                    th { "Store" }
                    th { "Location" }
                    th { "Listed" }
                    th {}
                }
            }
            tbody {
                @for deal in deals {
                    tr {
                        td { (deal.item_label()) }
                        td {
                            a href={ "/discover/detail?id=" (deal.id) } { (deal.title_label()) }
                        }
                        td class="num" { (deal.price_label()) }
                        td { (deal.store_label()) }
                        td { (deal.location_label()) }
                        td { (listed(deal)) }
                        td class="row-actions" {
                            (post_button("/discover/action",
                                &[("id", deal.id.to_string()), ("status", DealStatus::Saved.as_str().into())],
                                "Save", "btn-mini btn-like"))
                            (post_button("/discover/action",
                                &[("id", deal.id.to_string()), ("status", DealStatus::Deleted.as_str().into())],
                                "Reject", "btn-mini btn-nope"))
                        }
                    }
                }
            }
        }
    }
}

fn detail_overlay(deal: &Deal) -> Markup {
    html! {
        div class="overlay" role="dialog" aria-modal="true" {
            div class="detail" {
                h2 { (deal.title_label()) }
                dl {
                    dt { "Store" } dd { (deal.store_label()) }
                    dt { "Price" } dd { (deal.price_label()) }
                    dt { "Item" } dd { (deal.item_label()) }
                    dt { "Location" } dd { (deal.location_label()) }
                    dt { "Listed" } dd { (listed(deal)) }
                    @if let Some(batch) = &deal.batch_id {
                        dt { "Batch" } dd { (batch) }
                    }
                }
                @if let Some(url) = &deal.listing_url {
                    p { a href=(url) target="_blank" rel="noopener" { "Open listing ↗" } }
                }
                div class="detail-actions" {
                    (post_button("/discover/detail/reject", &[], "Reject", "btn btn-nope"))
                    (post_button("/discover/detail/save", &[], "Save", "btn btn-like"))
                    (post_button("/discover/detail/close", &[], "Close", "btn-secondary"))
                }
            }
        }
    }
}

pub(crate) fn listed(deal: &Deal) -> String {
    match deal.discovered() {
        Some(at) => at.format("%b %-d, %Y").to_string(),
        None => deal.discovered_at.clone().unwrap_or_default(),
    }
}
