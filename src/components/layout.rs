//! Base layout: the HTML skeleton, navigation and footer.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::db::User;

/// Runs in <head> so the stored theme applies before the body renders.
const THEME_INIT_SCRIPT: &str = r#"(function() {
    var theme = localStorage.getItem('theme');
    if (theme) {
        document.documentElement.setAttribute('data-theme', theme);
    } else if (window.matchMedia('(prefers-color-scheme: dark)').matches) {
        document.documentElement.setAttribute('data-theme', 'dark');
    }
})();"#;

const SITE_NAME: &str = "Blogfeed";

/// Base page layout builder.
///
/// The user is required so that authentication state is always handled
/// explicitly. Pass `None` for anonymous visitors.
///
/// # Example
///
/// ```ignore
/// let page = BaseLayout::new("My Page", user.as_ref()).render(content);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    user: Option<&'a User>,
}

impl<'a> BaseLayout<'a> {
    #[must_use]
    pub const fn new(title: &'a str, user: Option<&'a User>) -> Self {
        Self { title, user }
    }

    /// Render the complete page with `content` inside `<main class="container">`.
    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" data-theme="light" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="color-scheme" content="light dark";
                    title { (self.title) " - " (SITE_NAME) }
                    link rel="stylesheet" href="/static/css/style.css";
                    script { (PreEscaped(THEME_INIT_SCRIPT)) }
                }
                body {
                    (self.render_header())
                    main class="container" {
                        (content)
                    }
                    (Self::render_footer())
                    script src="/static/js/theme.js" {}
                }
            }
        }
    }

    fn render_header(&self) -> Markup {
        html! {
            header class="container" {
                nav {
                    ul {
                        li {
                            a href="/" {
                                strong class="site-logo" { (SITE_NAME) }
                            }
                        }
                    }
                    ul {
                        li { a href="/about/author/" { "Author" } }
                        li { a href="/about/tech/" { "Tech" } }
                        (self.render_auth_nav())
                        li {
                            button
                                id="theme-toggle"
                                class="theme-toggle"
                                title="Toggle dark mode"
                                aria-label="Toggle dark mode" { "🌓" }
                        }
                    }
                }
            }
        }
    }

    fn render_auth_nav(&self) -> Markup {
        match self.user {
            Some(user) => html! {
                li { a href="/create/" { "New post" } }
                li { a href="/follow/" { "Following" } }
                li { a href=(format!("/profile/{}/", user.username)) { (user.username) } }
                li {
                    form action="/auth/logout/" method="post" class="inline-form" {
                        button type="submit" class="link-button" { "Log out" }
                    }
                }
            },
            None => html! {
                li { a href="/auth/login/" { "Log in" } }
                li { a href="/auth/signup/" { "Sign up" } }
            },
        }
    }

    fn render_footer() -> Markup {
        html! {
            footer class="container" {
                small {
                    "© " (SITE_NAME)
                    " | "
                    a href="/about/author/" { "About the author" }
                    " | "
                    a href="/about/tech/" { "Technologies" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 1,
            username: "elliot".to_string(),
            first_name: "Elliot".to_string(),
            last_name: "Alderson".to_string(),
            email: String::new(),
            password_hash: "hash".to_string(),
            is_active: true,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_base_layout_basic_structure() {
        let html = BaseLayout::new("Test Page", None)
            .render(html! { h1 { "Test Content" } })
            .into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test Page - Blogfeed</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/static/css/style.css">"#));
        assert!(html.contains(r#"<main class="container"><h1>Test Content</h1></main>"#));
        assert!(html.contains("localStorage.getItem('theme')"));
    }

    #[test]
    fn test_base_layout_anonymous_user() {
        let html = BaseLayout::new("Anonymous", None)
            .render(html! {})
            .into_string();

        assert!(html.contains(r#"<a href="/auth/login/">Log in</a>"#));
        assert!(html.contains(r#"<a href="/auth/signup/">Sign up</a>"#));
        assert!(!html.contains(r#"href="/create/""#));
        assert!(!html.contains("/auth/logout/"));
    }

    #[test]
    fn test_base_layout_authenticated_user() {
        let user = test_user();
        let html = BaseLayout::new("User", Some(&user))
            .render(html! {})
            .into_string();

        assert!(html.contains(r#"<a href="/create/">New post</a>"#));
        assert!(html.contains(r#"<a href="/follow/">Following</a>"#));
        assert!(html.contains(r#"<a href="/profile/elliot/">elliot</a>"#));
        assert!(html.contains(r#"action="/auth/logout/""#));
        assert!(!html.contains(r#"href="/auth/login/""#));
    }

    #[test]
    fn test_base_layout_footer_links_about_pages() {
        let html = BaseLayout::new("Footer", None)
            .render(html! {})
            .into_string();
        assert!(html.contains(r#"<footer class="container">"#));
        assert!(html.contains(r#"<a href="/about/author/">About the author</a>"#));
        assert!(html.contains(r#"<a href="/about/tech/">Technologies</a>"#));
    }
}
