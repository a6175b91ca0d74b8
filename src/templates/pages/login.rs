use crate::templates::{desktop_layout, Nav};
use maud::{html, Markup};

pub fn login_page(email: &str, error: Option<&str>) -> Markup {
    desktop_layout(
        "Sign in",
        Nav::None,
        html! {
            main class="container narrow" {
                h1 { "Sign in" }
                p class="lead" { "Sign in to review today's deals." }

                @if let Some(msg) = error {
                    p class="form-error" role="alert" { (msg) }
                }

                form method="post" action="/login" class="login-form" {
                    label for="email" { "Email" }
                    input id="email" type="email" name="email" value=(email) required autocomplete="username";
                    label for="password" { "Password" }
                    input id="password" type="password" name="password" required autocomplete="current-password";
                    button type="submit" class="btn" { "Sign in" }
                }
            }
        },
    )
}
