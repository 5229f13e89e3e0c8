//! Submitted form data and field validation.
//!
//! Validation never fails with an `Err`: problems are collected into
//! [`FormErrors`] and the form is shown again with them.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

const USERNAME_MAX_LENGTH: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

/// Dot-atom local part, then dot-separated domain labels that neither start
/// nor end with a hyphen, ending in an alphabetic top-level domain.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$",
    )
    .expect("email pattern is valid")
});

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

/// Field name to error messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field; empty if it is valid.
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }
}

/// An uploaded file as received.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Browsers send an empty part when no file was chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.file_name.as_deref().unwrap_or("").is_empty()
    }
}

/// Raw post form submission.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub text: String,
    /// Group id as submitted; empty means no group.
    pub group: String,
    pub image: Option<Upload>,
}

impl PostInput {
    /// Trimmed text, or a field error if blank.
    pub fn clean_text(&self, errors: &mut FormErrors) -> Option<String> {
        clean_required(&self.text, "text", errors)
    }

    /// Parse the group choice. `Ok(None)` means no group.
    pub fn clean_group_id(&self, errors: &mut FormErrors) -> Option<Option<i64>> {
        let raw = self.group.trim();
        if raw.is_empty() {
            return Some(None);
        }
        if let Ok(id) = raw.parse::<i64>() {
            Some(Some(id))
        } else {
            errors.add("group", INVALID_CHOICE);
            None
        }
    }

    /// The upload, unless the browser sent an empty file part.
    #[must_use]
    pub fn upload(&self) -> Option<&Upload> {
        self.image.as_ref().filter(|upload| !upload.is_empty())
    }
}

/// Comment form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub text: String,
}

impl CommentInput {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        clean_required(&self.text, "text", &mut errors).ok_or(errors)
    }
}

/// Signup form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl SignupInput {
    /// Checks that need no database access. Username uniqueness is checked by the caller.
    #[must_use]
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();

        if let Some(username) = clean_required(&self.username, "username", &mut errors) {
            if username.chars().count() > USERNAME_MAX_LENGTH {
                errors.add(
                    "username",
                    format!("Ensure this value has at most {USERNAME_MAX_LENGTH} characters."),
                );
            } else if !USERNAME_RE.is_match(&username) {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
            }
        }

        let email = self.email.trim();
        if !email.is_empty() && !EMAIL_RE.is_match(email) {
            errors.add("email", "Enter a valid email address.");
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        } else if let Err(e) = crate::auth::validate_password_strength(&self.password2) {
            errors.add("password2", e.to_string());
        }

        errors
    }
}

/// Login form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginInput {
    #[must_use]
    pub fn remember_me(&self) -> bool {
        matches!(self.remember.as_deref(), Some("on" | "true" | "1"))
    }
}

/// Whether `slug` is usable in a URL path segment.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

fn clean_required(raw: &str, field: &'static str, errors: &mut FormErrors) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(value.to_string())
    }
}
