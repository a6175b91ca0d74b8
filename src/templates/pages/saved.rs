use crate::domain::Deal;
use crate::state::commits::FailedCommit;
use crate::state::DealsState;
use crate::templates::components::{commit_notice, post_button};
use crate::templates::pages::discover::listed;
use crate::templates::{desktop_layout, Nav};
use maud::{html, Markup};

pub fn saved_page(state: &DealsState, failed: &[FailedCommit], load_error: Option<&str>) -> Markup {
    let groups = state.saved_groups();
    let pending = state
        .pending_delete()
        .and_then(|id| state.saved().iter().find(|d| d.id == id));

    desktop_layout(
        "Saved",
        Nav::Saved,
        html! {
            main class="container" {
                h1 { "Saved deals" }
                (commit_notice(failed, "/saved"))
                @if let Some(err) = load_error {
                    p class="form-error" role="alert" { "Could not load saved deals: " (err) }
                }
                @if groups.is_empty() {
                    div class="empty-state" {
                        p { "Nothing saved yet. Swipe right on a deal to keep it here." }
                    }
                }
                @for (name, deals) in &groups {
                    section class="saved-group" {
                        h2 {
                            (name)
                            span class="count-badge" { (item_count(deals.len())) }
                        }
                        ul class="saved-list" {
                            @for deal in deals {
                                (saved_row(deal))
                            }
                        }
                    }
                }
                @if let Some(deal) = pending {
                    (delete_modal(deal))
                }
            }
        },
    )
}

fn item_count(n: usize) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{n} items")
    }
}

fn saved_row(deal: &Deal) -> Markup {
    html! {
        li class="saved-row" {
            div class="saved-main" {
                @if let Some(url) = &deal.listing_url {
                    a href=(url) target="_blank" rel="noopener" { (deal.title_label()) }
                } @else {
                    span { (deal.title_label()) }
                }
                div class="saved-meta" {
                    (deal.price_label()) " · " (deal.store_label()) " · " (deal.location_label())
                    " · " (listed(deal))
                }
            }
            (post_button("/saved/delete", &[("id", deal.id.to_string())], "Delete", "btn-mini btn-nope"))
        }
    }
}

fn delete_modal(deal: &Deal) -> Markup {
    html! {
        div class="overlay" role="dialog" aria-modal="true" {
            div class="modal" {
                h2 { "Delete this deal?" }
                p { (deal.title_label()) " will be removed from your saved list." }
                div class="modal-actions" {
                    (post_button("/saved/delete/cancel", &[], "Cancel", "btn-secondary"))
                    (post_button("/saved/delete/confirm", &[], "Delete", "btn btn-nope"))
                }
            }
        }
    }
}
