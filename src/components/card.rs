//! Cards for posts and comments in feeds and on the post page.

use maud::{html, Markup, Render};

use crate::db::{CommentView, PostView};

/// Feed dates show the day only; stored timestamps are ISO 8601.
fn display_date(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

/// Plain text with line breaks kept.
fn paragraphs(text: &str) -> Markup {
    html! {
        @for (i, line) in text.lines().enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}

/// One post as shown in a feed or on its own page.
#[derive(Debug, Clone)]
pub struct PostCard<'a> {
    pub post: &'a PostView,
    pub show_group: bool,
    pub show_detail_link: bool,
}

impl<'a> PostCard<'a> {
    #[must_use]
    pub const fn new(post: &'a PostView) -> Self {
        Self {
            post,
            show_group: true,
            show_detail_link: true,
        }
    }

    /// Hide the group link, e.g. on the group's own page.
    #[must_use]
    pub const fn without_group(mut self) -> Self {
        self.show_group = false;
        self
    }

    /// Hide the "details" link, e.g. on the post's own page.
    #[must_use]
    pub const fn without_detail_link(mut self) -> Self {
        self.show_detail_link = false;
        self
    }
}

impl Render for PostCard<'_> {
    fn render(&self) -> Markup {
        let post = self.post;

        html! {
            article class="post-card" id=(format!("post-{}", post.id)) {
                header {
                    a href=(format!("/profile/{}/", post.author_username)) {
                        strong { (post.author_display_name()) }
                    }
                    " "
                    small class="post-date" { time datetime=(post.created_at) { (display_date(&post.created_at)) } }
                }
                @if let Some(image) = &post.image {
                    img class="post-image" src=(format!("/media/{image}")) alt="";
                }
                p class="post-text" { (paragraphs(&post.text)) }
                footer {
                    @if self.show_detail_link {
                        a href=(format!("/posts/{}/", post.id)) { "details" }
                    }
                    @if self.show_group {
                        @if let (Some(slug), Some(title)) = (&post.group_slug, &post.group_title) {
                            " "
                            a class="group-link" href=(format!("/group/{slug}/")) { "#" (title) }
                        }
                    }
                }
            }
        }
    }
}

/// Comments under a post, in the order given.
#[derive(Debug, Clone)]
pub struct CommentList<'a>(pub &'a [CommentView]);

impl Render for CommentList<'_> {
    fn render(&self) -> Markup {
        html! {
            section class="comments" {
                @for comment in self.0 {
                    article class="comment" id=(format!("comment-{}", comment.id)) {
                        header {
                            a href=(format!("/profile/{}/", comment.author_username)) {
                                (comment.author_username)
                            }
                            " "
                            small { (display_date(&comment.created_at)) }
                        }
                        p { (paragraphs(&comment.text)) }
                    }
                }
            }
        }
    }
}

/// Placeholder for an empty listing.
#[derive(Debug, Clone)]
pub struct EmptyState<'a> {
    pub message: &'a str,
}

impl<'a> EmptyState<'a> {
    #[must_use]
    pub const fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Render for EmptyState<'_> {
    fn render(&self) -> Markup {
        html! {
            p class="empty-state" { (self.message) }
        }
    }
}
