//! Post detail and the create/edit post form.

use maud::{html, Markup, Render};

use crate::components::{
    BaseLayout, CommentList, Form, FormGroup, Input, PostCard, Select, SubmitButton, TextArea,
};
use crate::db::{Group, User};
use crate::forms::FormErrors;
use crate::posts::PostDetail;

/// `GET /posts/{id}/`
#[must_use]
pub fn render_post_detail_page(detail: &PostDetail, user: Option<&User>) -> Markup {
    let post = &detail.post;
    let is_author = user.is_some_and(|u| u.id == post.author_id);
    let title: String = post.text.chars().take(30).collect();
    let comment_action = format!("/posts/{}/comment/", post.id);

    let content = html! {
        div class="post-detail" {
            aside class="post-author" {
                p {
                    "Author: "
                    a href=(format!("/profile/{}/", post.author_username)) { (post.author_display_name()) }
                }
                p { "Posts by this author: " strong { (detail.author_post_count) } }
                @if let (Some(slug), Some(group_title)) = (&post.group_slug, &post.group_title) {
                    p {
                        "Group: "
                        a href=(format!("/group/{slug}/")) { (group_title) }
                    }
                }
            }

            (PostCard::new(post).without_detail_link())

            @if is_author {
                div class="post-actions" {
                    a href=(format!("/posts/{}/edit/", post.id)) role="button" { "Edit" }
                    " "
                    form action=(format!("/posts/{}/delete/", post.id)) method="post" class="inline-form" {
                        button type="submit" class="secondary" { "Delete" }
                    }
                }
            }

            @if user.is_some() {
                (Form::post(&comment_action, html! {
                    (FormGroup::new("Add a comment", "id_comment_text",
                        TextArea::new("text").id("id_comment_text").rows(3).required().render()))
                    (SubmitButton::new("Send"))
                }).class("comment-form"))
            }

            h2 { "Comments (" (detail.comments.len()) ")" }
            (CommentList(&detail.comments))
        }
    };
    BaseLayout::new(&title, user).render(content)
}

/// What the post form shows.
#[derive(Debug)]
pub struct PostFormParams<'a> {
    pub user: &'a User,
    /// The post being edited; `None` on the create form.
    pub post_id: Option<i64>,
    pub text: &'a str,
    /// Selected group id as a form value; empty for none.
    pub group: &'a str,
    pub groups: &'a [Group],
    /// Image path already attached to the edited post.
    pub current_image: Option<&'a str>,
    pub errors: &'a FormErrors,
}

/// `GET /create/` and `GET /posts/{id}/edit/`, and re-rendered with errors
/// after an invalid submission.
#[must_use]
pub fn render_post_form_page(params: &PostFormParams<'_>) -> Markup {
    let (title, action, button) = match params.post_id {
        Some(id) => ("Edit post", format!("/posts/{id}/edit/"), "Save"),
        None => ("New post", "/create/".to_string(), "Publish"),
    };

    let group_select = params.groups.iter().fold(
        Select::new("group").id("id_group").option("", "---------"),
        |select, group| select.option(group.id.to_string(), group.title.clone()),
    );
    let selected = (!params.group.is_empty()).then_some(params.group);

    let content = html! {
        h1 { (title) }
        (Form::post(&action, html! {
            (FormGroup::new("Text", "id_text",
                TextArea::new("text").id("id_text").rows(8).required().value(params.text).render())
                .help("Text of the new post")
                .errors(params.errors.field("text")))
            (FormGroup::new("Group", "id_group", group_select.selected_opt(selected).render())
                .help("Group the post belongs to")
                .errors(params.errors.field("group")))
            @if let Some(image) = params.current_image {
                p class="current-image" {
                    "Current image: "
                    a href=(format!("/media/{image}")) { (image) }
                }
            }
            (FormGroup::new("Image", "id_image",
                Input::file("image").id("id_image").accept("image/png,image/jpeg").render())
                .errors(params.errors.field("image")))
            (SubmitButton::new(button))
        }).multipart())
    };
    BaseLayout::new(title, Some(params.user)).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CommentView, PostView};

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{id}"),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password_hash: String::new(),
            is_active: true,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn detail() -> PostDetail {
        PostDetail {
            post: PostView {
                id: 5,
                text: "Hello from the detail page".to_string(),
                created_at: "2024-01-02T00:00:00.000Z".to_string(),
                image: None,
                author_id: 1,
                author_username: "user1".to_string(),
                author_first_name: String::new(),
                author_last_name: String::new(),
                group_id: None,
                group_slug: None,
                group_title: None,
            },
            comments: vec![CommentView {
                id: 9,
                post_id: 5,
                author_id: 2,
                author_username: "user2".to_string(),
                text: "Nice post".to_string(),
                created_at: "2024-01-03T00:00:00.000Z".to_string(),
            }],
            author_post_count: 4,
        }
    }

    #[test]
    fn test_detail_page_for_author() {
        let author = user(1);
        let html = render_post_detail_page(&detail(), Some(&author)).into_string();
        assert!(html.contains(r#"href="/posts/5/edit/""#));
        assert!(html.contains(r#"action="/posts/5/delete/""#));
        assert!(html.contains(r#"action="/posts/5/comment/""#));
        assert!(html.contains("Posts by this author: <strong>4</strong>"));
        assert!(html.contains("Nice post"));
    }

    #[test]
    fn test_detail_page_for_other_users() {
        let other = user(2);
        let html = render_post_detail_page(&detail(), Some(&other)).into_string();
        assert!(!html.contains("/posts/5/edit/"));
        assert!(html.contains(r#"action="/posts/5/comment/""#));

        let html = render_post_detail_page(&detail(), None).into_string();
        assert!(!html.contains("/posts/5/comment/"));
    }

    #[test]
    fn test_post_form_shows_errors_and_groups() {
        let author = user(1);
        let groups = vec![Group {
            id: 3,
            title: "Robots".to_string(),
            slug: "robots".to_string(),
            description: String::new(),
        }];
        let mut errors = FormErrors::new();
        errors.add("text", "This field is required.");

        let html = render_post_form_page(&PostFormParams {
            user: &author,
            post_id: None,
            text: "",
            group: "3",
            groups: &groups,
            current_image: None,
            errors: &errors,
        })
        .into_string();

        assert!(html.contains(r#"action="/create/""#));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"<option value="3" selected>Robots</option>"#));
        assert!(html.contains("This field is required."));
    }

    #[test]
    fn test_edit_form_targets_post() {
        let author = user(1);
        let html = render_post_form_page(&PostFormParams {
            user: &author,
            post_id: Some(5),
            text: "old text",
            group: "",
            groups: &[],
            current_image: Some("posts/abc.png"),
            errors: &FormErrors::new(),
        })
        .into_string();

        assert!(html.contains(r#"action="/posts/5/edit/""#));
        assert!(html.contains("old text"));
        assert!(html.contains("posts/abc.png"));
    }
}
