//! Pagination controls for feed pages.
//!
//! Renders previous, nearby page numbers, and next links.
//! Page numbers are 1-indexed, matching the `?page=` query parameter.

use maud::{html, Markup, Render};

use crate::feed::Page;

/// Navigation links for a paginated feed. Hidden when there is one page.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub current_page: usize,
    pub total_pages: usize,
    /// Base URL for page links; `?page=` is appended
    pub base_url: String,
}

impl Pagination {
    #[must_use]
    pub fn new(current_page: usize, total_pages: usize, base_url: &str) -> Self {
        Self {
            current_page: current_page.max(1),
            total_pages: total_pages.max(1),
            base_url: base_url.to_string(),
        }
    }

    /// Controls for an assembled feed page.
    #[must_use]
    pub fn for_page<T>(page: &Page<T>, base_url: &str) -> Self {
        Self::new(page.number, page.num_pages, base_url)
    }

    fn build_url(&self, page_num: usize) -> String {
        if page_num <= 1 {
            self.base_url.clone()
        } else {
            format!("{}?page={page_num}", self.base_url)
        }
    }

    #[must_use]
    pub fn should_display(&self) -> bool {
        self.total_pages > 1
    }
}

impl Render for Pagination {
    fn render(&self) -> Markup {
        if !self.should_display() {
            return html! {};
        }

        let current = self.current_page;
        let total = self.total_pages;

        let start = current.saturating_sub(2).max(1);
        let end = (current + 2).min(total);

        html! {
            nav class="pagination" {
                @if current > 1 {
                    a href=(self.build_url(current - 1)) { "\u{00ab} Previous" }
                } @else {
                    span class="disabled" { "\u{00ab} Previous" }
                }

                @if start > 1 {
                    a href=(self.build_url(1)) { "1" }
                    @if start > 2 {
                        span { "..." }
                    }
                }

                @for page_num in start..=end {
                    @if page_num == current {
                        span class="current" { (page_num) }
                    } @else {
                        a href=(self.build_url(page_num)) { (page_num) }
                    }
                }

                @if end < total {
                    @if end + 1 < total {
                        span { "..." }
                    }
                    a href=(self.build_url(total)) { (total) }
                }

                @if current < total {
                    a href=(self.build_url(current + 1)) { "Next \u{00bb}" }
                } @else {
                    span class="disabled" { "Next \u{00bb}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let pagination = Pagination::new(1, 10, "/group/robots/");
        assert_eq!(pagination.build_url(1), "/group/robots/");
        assert_eq!(pagination.build_url(5), "/group/robots/?page=5");
    }

    #[test]
    fn test_single_page_renders_nothing() {
        let pagination = Pagination::new(1, 1, "/");
        assert!(!pagination.should_display());
        assert!(pagination.render().into_string().is_empty());
    }

    #[test]
    fn test_render_first_page() {
        let html = Pagination::new(1, 10, "/").render().into_string();

        assert!(html.contains(r#"<span class="disabled">« Previous</span>"#));
        assert!(html.contains(r#"<span class="current">1</span>"#));
        assert!(html.contains(r#"href="/?page=2""#));
        assert!(html.contains(r#"href="/?page=10""#));
        assert!(html.contains("Next"));
    }

    #[test]
    fn test_render_middle_page() {
        let html = Pagination::new(6, 10, "/").render().into_string();

        assert!(html.contains(r#"<a href="/">1</a>"#));
        assert!(html.contains("..."));
        for n in [4, 5, 7, 8] {
            assert!(html.contains(&format!(r#"href="/?page={n}">{n}<"#)));
        }
        assert!(html.contains(r#"<span class="current">6</span>"#));
        assert!(html.contains(">10<"));
    }

    #[test]
    fn test_render_last_page() {
        let html = Pagination::new(10, 10, "/").render().into_string();
        assert!(html.contains(r#"href="/?page=9""#));
        assert!(html.contains(r#"<span class="disabled">Next »</span>"#));
    }

    #[test]
    fn test_for_page() {
        let page = crate::feed::Paginator::new(25, 10).page(3, vec![1, 2, 3, 4, 5]);
        let pagination = Pagination::for_page(&page, "/profile/elliot/");
        assert_eq!(pagination.current_page, 3);
        assert_eq!(pagination.total_pages, 3);
    }
}
