use crate::state::commits::FailedCommit;
use crate::state::config::{Toast, ToastKind};
use maud::{html, Markup};

pub mod error;

pub use error::html_error_response;

/// A one-field POST form rendered as a single button.
pub fn post_button(action: &str, fields: &[(&str, String)], label: &str, class: &str) -> Markup {
    html! {
        form method="post" action=(action) class="inline" {
            @for (name, value) in fields {
                input type="hidden" name=(name) value=(value);
            }
            button type="submit" class=(class) { (label) }
        }
    }
}

pub fn toast(toast: Option<&Toast>) -> Markup {
    html! {
        @if let Some(t) = toast {
            @let kind = match t.kind {
                ToastKind::Success => "config-toast-success",
                ToastKind::Error => "config-toast-error",
            };
            div class={ "config-toast show " (kind) } role="status" { (t.message) }
        }
    }
}

/// Non-blocking banner for status updates the data service rejected.
pub fn commit_notice(failed: &[FailedCommit], back: &str) -> Markup {
    html! {
        @if !failed.is_empty() {
            div class="commit-notice" role="alert" {
                p {
                    (failed.len())
                    @if failed.len() == 1 { " change" } @else { " changes" }
                    " could not be saved: "
                    (failed[0].error)
                }
                (post_button("/commits/retry", &[("back", back.to_string())], "Retry", "btn-secondary"))
            }
        }
    }
}
