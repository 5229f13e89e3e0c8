//! Form components for maud templates.
//!
//! These match the styles defined in `static/css/style.css`.

use maud::{html, Markup, Render};

/// A form container element.
#[derive(Debug)]
pub struct Form<'a> {
    /// Form action URL
    pub action: &'a str,
    /// HTTP method ("get" or "post")
    pub method: &'a str,
    /// Form content (inputs, buttons, etc.)
    pub content: Markup,
    /// Optional CSS class
    pub class: Option<&'a str>,
    /// Enable multipart/form-data encoding
    pub multipart: bool,
}

impl<'a> Form<'a> {
    #[must_use]
    pub fn new(action: &'a str, method: &'a str, content: Markup) -> Self {
        Self {
            action,
            method,
            content,
            class: None,
            multipart: false,
        }
    }

    /// Create a POST form.
    #[must_use]
    pub fn post(action: &'a str, content: Markup) -> Self {
        Self::new(action, "post", content)
    }

    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    /// Enable multipart/form-data encoding (for file uploads).
    #[must_use]
    pub fn multipart(mut self) -> Self {
        self.multipart = true;
        self
    }
}

impl Render for Form<'_> {
    fn render(&self) -> Markup {
        html! {
            form
                action=(self.action)
                method=(self.method)
                class=[self.class]
                enctype=[self.multipart.then_some("multipart/form-data")]
            {
                (self.content)
            }
        }
    }
}

/// An input element.
#[derive(Debug, Clone)]
pub struct Input<'a> {
    pub name: &'a str,
    /// "text", "password", "email", "file", ...
    pub r#type: &'a str,
    pub value: Option<&'a str>,
    pub required: bool,
    pub id: Option<&'a str>,
    pub autocomplete: Option<&'a str>,
    pub accept: Option<&'a str>,
    pub maxlength: Option<usize>,
}

impl<'a> Input<'a> {
    #[must_use]
    pub fn new(name: &'a str, r#type: &'a str) -> Self {
        Self {
            name,
            r#type,
            value: None,
            required: false,
            id: None,
            autocomplete: None,
            accept: None,
            maxlength: None,
        }
    }

    #[must_use]
    pub fn text(name: &'a str) -> Self {
        Self::new(name, "text")
    }

    #[must_use]
    pub fn password(name: &'a str) -> Self {
        Self::new(name, "password")
    }

    #[must_use]
    pub fn email(name: &'a str) -> Self {
        Self::new(name, "email")
    }

    #[must_use]
    pub fn file(name: &'a str) -> Self {
        Self::new(name, "file")
    }

    #[must_use]
    pub fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn autocomplete(mut self, autocomplete: &'a str) -> Self {
        self.autocomplete = Some(autocomplete);
        self
    }

    /// Restrict the file picker, e.g. `image/png,image/jpeg`.
    #[must_use]
    pub fn accept(mut self, accept: &'a str) -> Self {
        self.accept = Some(accept);
        self
    }

    #[must_use]
    pub fn maxlength(mut self, maxlength: usize) -> Self {
        self.maxlength = Some(maxlength);
        self
    }
}

impl Render for Input<'_> {
    fn render(&self) -> Markup {
        html! {
            input
                type=(self.r#type)
                name=(self.name)
                value=[self.value]
                required[self.required]
                id=[self.id]
                autocomplete=[self.autocomplete]
                accept=[self.accept]
                maxlength=[self.maxlength];
        }
    }
}

/// A textarea element.
#[derive(Debug)]
pub struct TextArea<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub rows: Option<u32>,
    pub required: bool,
    pub id: Option<&'a str>,
}

impl<'a> TextArea<'a> {
    #[must_use]
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            value: None,
            rows: None,
            required: false,
            id: None,
        }
    }

    #[must_use]
    pub fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }
}

impl Render for TextArea<'_> {
    fn render(&self) -> Markup {
        html! {
            textarea
                name=(self.name)
                rows=[self.rows]
                required[self.required]
                id=[self.id]
            {
                @if let Some(value) = self.value {
                    (value)
                }
            }
        }
    }
}

/// A select dropdown element.
#[derive(Debug)]
pub struct Select<'a> {
    pub name: &'a str,
    pub options: Vec<SelectOption>,
    /// Currently selected value
    pub selected: Option<&'a str>,
    pub id: Option<&'a str>,
}

impl<'a> Select<'a> {
    #[must_use]
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            options: Vec::new(),
            selected: None,
            id: None,
        }
    }

    #[must_use]
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

    /// Set the selected value if Some.
    #[must_use]
    pub fn selected_opt(mut self, selected: Option<&'a str>) -> Self {
        self.selected = selected;
        self
    }

    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }
}

impl Render for Select<'_> {
    fn render(&self) -> Markup {
        html! {
            select name=(self.name) id=[self.id] {
                @for opt in &self.options {
                    option
                        value=(opt.value)
                        selected[self.selected == Some(opt.value.as_str())]
                    {
                        (opt.label)
                    }
                }
            }
        }
    }
}

/// An option for a select element.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A hidden input element.
#[derive(Debug)]
pub struct HiddenInput<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> HiddenInput<'a> {
    #[must_use]
    pub fn new(name: &'a str, value: &'a str) -> Self {
        Self { name, value }
    }
}

impl Render for HiddenInput<'_> {
    fn render(&self) -> Markup {
        html! {
            input type="hidden" name=(self.name) value=(self.value);
        }
    }
}

/// A checkbox with its label.
#[derive(Debug)]
pub struct Checkbox<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub checked: bool,
}

impl<'a> Checkbox<'a> {
    #[must_use]
    pub fn new(name: &'a str, label: &'a str) -> Self {
        Self {
            name,
            label,
            checked: false,
        }
    }

    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

impl Render for Checkbox<'_> {
    fn render(&self) -> Markup {
        html! {
            label {
                input type="checkbox" name=(self.name) value="on" checked[self.checked];
                " "
                (self.label)
            }
        }
    }
}

/// Validation messages for one field.
#[derive(Debug)]
pub struct FieldErrors<'a>(pub &'a [String]);

impl Render for FieldErrors<'_> {
    fn render(&self) -> Markup {
        html! {
            @if !self.0.is_empty() {
                ul class="errorlist" {
                    @for message in self.0 {
                        li { (message) }
                    }
                }
            }
        }
    }
}

/// A label, input, optional help text and the field's errors.
#[derive(Debug)]
pub struct FormGroup<'a> {
    pub label: &'a str,
    /// Input ID (also used for label's `for` attribute)
    pub id: &'a str,
    pub input: Markup,
    pub help: Option<&'a str>,
    pub errors: &'a [String],
}

impl<'a> FormGroup<'a> {
    #[must_use]
    pub fn new(label: &'a str, id: &'a str, input: Markup) -> Self {
        Self {
            label,
            id,
            input,
            help: None,
            errors: &[],
        }
    }

    #[must_use]
    pub fn help(mut self, help: &'a str) -> Self {
        self.help = Some(help);
        self
    }

    #[must_use]
    pub fn errors(mut self, errors: &'a [String]) -> Self {
        self.errors = errors;
        self
    }
}

impl Render for FormGroup<'_> {
    fn render(&self) -> Markup {
        html! {
            div class=(if self.errors.is_empty() { "form-group" } else { "form-group has-errors" }) {
                label for=(self.id) { (self.label) }
                (self.input)
                @if let Some(help) = self.help {
                    small { (help) }
                }
                (FieldErrors(self.errors))
            }
        }
    }
}

/// A submit button.
#[derive(Debug)]
pub struct SubmitButton<'a> {
    pub label: &'a str,
    pub class: Option<&'a str>,
}

impl<'a> SubmitButton<'a> {
    #[must_use]
    pub const fn new(label: &'a str) -> Self {
        Self { label, class: None }
    }

    #[must_use]
    pub const fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }
}

impl Render for SubmitButton<'_> {
    fn render(&self) -> Markup {
        html! {
            button type="submit" class=[self.class] { (self.label) }
        }
    }
}
