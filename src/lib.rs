//! Blogfeed library.
//!
//! A small blogging platform: users write posts, file them under groups,
//! comment on each other's posts and follow authors. Feeds are paginated and
//! the home feed is served from a short-lived cache.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod auth;
pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod follow;
pub mod forms;
pub mod media;
pub mod posts;
pub mod web;
