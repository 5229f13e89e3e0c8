//! Maud-based page templates for the web UI.
//!
//! Each page module exports render functions producing a complete HTML page.

pub mod about;
pub mod auth;
pub mod error;
pub mod feed;
pub mod post;

pub use about::{render_author_page, render_tech_page};
pub use auth::{render_login_page, render_signup_page, LoginPageParams};
pub use error::{render_not_found_page, render_server_error_page};
pub use feed::{
    render_following_page, render_group_page, render_home_page, render_profile_page,
};
pub use post::{render_post_detail_page, render_post_form_page, PostFormParams};
