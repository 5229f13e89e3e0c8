//! Themed error pages.

use maud::{html, Markup};

use crate::components::BaseLayout;
use crate::db::User;

/// 404 page, naming the path that was requested when known.
#[must_use]
pub fn render_not_found_page(path: Option<&str>, user: Option<&User>) -> Markup {
    let content = html! {
        section class="error-page" {
            h1 { "Page not found" }
            @if let Some(path) = path {
                p { "Nothing lives at " code { (path) } "." }
            } @else {
                p { "The page you were looking for does not exist." }
            }
            a href="/" role="button" { "Back to the home page" }
        }
    };
    BaseLayout::new("Page not found", user).render(content)
}

/// 500 page. Details go to the log, never to the visitor.
#[must_use]
pub fn render_server_error_page() -> Markup {
    let content = html! {
        section class="error-page" {
            h1 { "Something went wrong" }
            p { "The server hit an unexpected error. Please try again later." }
            a href="/" role="button" { "Back to the home page" }
        }
    };
    BaseLayout::new("Server error", None).render(content)
}
