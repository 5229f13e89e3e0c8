//! Static informational pages.

use maud::{html, Markup};

use crate::components::BaseLayout;
use crate::db::User;

/// `GET /about/author/`
#[must_use]
pub fn render_author_page(user: Option<&User>) -> Markup {
    let content = html! {
        article class="about" {
            h1 { "About the author" }
            p {
                "Blogfeed is a small place to write short posts, file them under "
                "groups, follow the people you like and talk in the comments."
            }
            p {
                "It is maintained by a single developer. Bug reports and ideas "
                "are always welcome."
            }
        }
    };
    BaseLayout::new("About the author", user).render(content)
}

/// `GET /about/tech/`
#[must_use]
pub fn render_tech_page(user: Option<&User>) -> Markup {
    let content = html! {
        article class="about" {
            h1 { "Technologies" }
            ul {
                li { "Rust with the tokio runtime" }
                li { "axum and tower-http for HTTP" }
                li { "SQLite through sqlx" }
                li { "maud for HTML templates" }
                li { "Argon2 password hashing" }
            }
        }
    };
    BaseLayout::new("Technologies", user).render(content)
}
