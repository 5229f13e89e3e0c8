//! Maud HTML template components for the web UI.
//!
//! - `layout`: Base page layout and navigation
//! - `alert`: Error messages
//! - `card`: Post cards and comment lists
//! - `form`: Form elements with field error display
//! - `pagination`: Page navigation controls
//!
//! # Example
//!
//! ```ignore
//! use maud::{html, Markup};
//! use crate::components::{Alert, BaseLayout, Input};
//!
//! fn my_page() -> Markup {
//!     let content = html! {
//!         h1 { "Hello World" }
//!         (Alert::error("Something went wrong."))
//!         (Input::text("username"))
//!     };
//!     BaseLayout::new("My Page", None).render(content)
//! }
//! ```

pub mod alert;
pub mod card;
pub mod form;
pub mod layout;
pub mod pagination;

pub use alert::Alert;
pub use card::{CommentList, EmptyState, PostCard};
pub use form::{
    Checkbox, FieldErrors, Form, FormGroup, HiddenInput, Input, Select, SelectOption,
    SubmitButton, TextArea,
};
pub use layout::BaseLayout;
pub use pagination::Pagination;

pub use maud::{html, Markup, PreEscaped, DOCTYPE};
