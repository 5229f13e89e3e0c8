//! Login and signup pages.

use maud::{html, Markup, Render};

use crate::components::{
    Alert, BaseLayout, Checkbox, Form, FormGroup, HiddenInput, Input, SubmitButton,
};
use crate::forms::{FormErrors, SignupInput};

/// What the login page shows.
#[derive(Debug, Default)]
pub struct LoginPageParams<'a> {
    pub error: Option<&'a str>,
    pub username: &'a str,
    pub remember: bool,
    /// Where to go after logging in; carried through the form.
    pub next: Option<&'a str>,
}

/// `GET /auth/login/`
#[must_use]
pub fn render_login_page(params: &LoginPageParams<'_>) -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Log in" }

            @if let Some(e) = params.error {
                (Alert::error(e))
            }

            (Form::post("/auth/login/", html! {
                @if let Some(next) = params.next {
                    (HiddenInput::new("next", next))
                }
                (FormGroup::new("Username", "id_username",
                    Input::text("username").id("id_username").value(params.username)
                        .autocomplete("username").required().render()))
                (FormGroup::new("Password", "id_password",
                    Input::password("password").id("id_password")
                        .autocomplete("current-password").required().render()))
                (Checkbox::new("remember", "Remember me for 30 days").checked(params.remember))
                (SubmitButton::new("Log in"))
            }))

            p class="auth-switch" {
                "No account yet? "
                a href="/auth/signup/" { "Sign up" }
            }
        }
    };
    BaseLayout::new("Log in", None).render(content)
}

/// `GET /auth/signup/`, and re-rendered with errors after an invalid submission.
#[must_use]
pub fn render_signup_page(input: &SignupInput, errors: &FormErrors) -> Markup {
    let content = html! {
        div class="auth-container" {
            h1 { "Sign up" }

            (Form::post("/auth/signup/", html! {
                (FormGroup::new("First name", "id_first_name",
                    Input::text("first_name").id("id_first_name").value(&input.first_name).render())
                    .errors(errors.field("first_name")))
                (FormGroup::new("Last name", "id_last_name",
                    Input::text("last_name").id("id_last_name").value(&input.last_name).render())
                    .errors(errors.field("last_name")))
                (FormGroup::new("Username", "id_username",
                    Input::text("username").id("id_username").value(&input.username)
                        .maxlength(150).autocomplete("username").required().render())
                    .help("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.")
                    .errors(errors.field("username")))
                (FormGroup::new("Email", "id_email",
                    Input::email("email").id("id_email").value(&input.email).render())
                    .errors(errors.field("email")))
                (FormGroup::new("Password", "id_password1",
                    Input::password("password1").id("id_password1")
                        .autocomplete("new-password").required().render())
                    .help("Your password must contain at least 8 characters.")
                    .errors(errors.field("password1")))
                (FormGroup::new("Password confirmation", "id_password2",
                    Input::password("password2").id("id_password2")
                        .autocomplete("new-password").required().render())
                    .errors(errors.field("password2")))
                (SubmitButton::new("Sign up"))
            }))

            p class="auth-switch" {
                "Already registered? "
                a href="/auth/login/" { "Log in" }
            }
        }
    };
    BaseLayout::new("Sign up", None).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_carries_next() {
        let html = render_login_page(&LoginPageParams {
            next: Some("/create/"),
            ..LoginPageParams::default()
        })
        .into_string();
        assert!(html.contains(r#"<input type="hidden" name="next" value="/create/">"#));
        assert!(html.contains(r#"action="/auth/login/""#));
    }

    #[test]
    fn test_login_page_error() {
        let html = render_login_page(&LoginPageParams {
            error: Some("Please enter a correct username and password."),
            username: "elliot",
            ..LoginPageParams::default()
        })
        .into_string();
        assert!(html.contains("Please enter a correct username and password."));
        assert!(html.contains(r#"value="elliot""#));
    }

    #[test]
    fn test_signup_page_keeps_values_but_not_passwords() {
        let input = SignupInput {
            username: "elliot".to_string(),
            password1: "secret-one".to_string(),
            ..SignupInput::default()
        };
        let mut errors = FormErrors::new();
        errors.add("password2", "This field is required.");

        let html = render_signup_page(&input, &errors).into_string();
        assert!(html.contains(r#"value="elliot""#));
        assert!(!html.contains("secret-one"));
        assert!(html.contains("This field is required."));
    }
}
