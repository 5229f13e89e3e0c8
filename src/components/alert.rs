//! Alert components for page-level messages.

use maud::{html, Markup, Render};

/// An error message box, e.g. for a failed login.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub message: &'a str,
}

impl<'a> Alert<'a> {
    #[must_use]
    pub const fn error(message: &'a str) -> Self {
        Self { message }
    }
}

impl Render for Alert<'_> {
    fn render(&self) -> Markup {
        html! {
            article class="error" role="alert" {
                (self.message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_alert() {
        let html = Alert::error("Bad").render().into_string();
        assert!(html.contains(r#"class="error""#));
        assert!(html.contains(r#"role="alert""#));
        assert!(html.contains("Bad"));
    }

    #[test]
    fn test_alert_escapes_message() {
        let html = Alert::error("<script>").render().into_string();
        assert!(html.contains("&lt;script&gt;"));
    }
}
