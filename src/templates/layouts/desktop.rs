use maud::{html, Markup, DOCTYPE};

/// Top-level sections shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Discover,
    Saved,
    Config,
    /// Signed out: no navigation at all.
    None,
}

pub fn desktop_layout(title: &str, nav: Nav, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=5.0, user-scalable=yes, viewport-fit=cover";
                title { (title) " · DealDeck" }
                link rel="stylesheet" href="/static/main.css";
                script src="/static/swipe.js" defer {}
            }
            body {
                @if nav != Nav::None {
                    header id="app-header" class="app-header" {
                        h3 { "DealDeck" }
                        nav {
                            ul {
                                li { a href="/discover" class=[active(nav == Nav::Discover)] { "Discover" } }
                                li { a href="/saved" class=[active(nav == Nav::Saved)] { "Saved" } }
                                li { a href="/config" class=[active(nav == Nav::Config)] { "Config" } }
                            }
                        }
                        form method="post" action="/logout" class="inline" {
                            button type="submit" class="btn-secondary" { "Log out" }
                        }
                    }
                }
                (content)
            }
        }
    }
}

fn active(on: bool) -> Option<&'static str> {
    on.then_some("active")
}
