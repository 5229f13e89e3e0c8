use axum::extract::{Multipart, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use tracing::{debug, info};

use super::{pages, AppState};
use crate::auth::{MaybeUser, RequireUser};
use crate::db::{self, User};
use crate::error::{BlogError, BlogResult, OrNotFound};
use crate::feed::PageRequest;
use crate::forms::{CommentInput, FormErrors, PostInput, Upload};
use crate::posts::{self, PostOutcome};

/// Create the router with all feed, post and follow routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/group/:slug/", get(group_posts))
        .route("/profile/:username/", get(profile))
        .route(
            "/profile/:username/follow/",
            get(profile_follow).post(profile_follow),
        )
        .route(
            "/profile/:username/unfollow/",
            get(profile_unfollow).post(profile_unfollow),
        )
        .route("/follow/", get(follow_index))
        .route("/create/", get(create_form).post(create_post))
        .route("/posts/:post_id/", get(post_detail))
        .route("/posts/:post_id/edit/", get(edit_form).post(edit_post))
        .route("/posts/:post_id/delete/", post(delete_post))
        .route("/posts/:post_id/comment/", post(add_comment))
        .route("/about/author/", get(about_author))
        .route("/about/tech/", get(about_tech))
        .route("/healthz", get(health))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    page: Option<String>,
}

impl PageParams {
    fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

/// Post ids that are not integers name no post.
fn parse_post_id(raw: &str) -> BlogResult<i64> {
    raw.parse().map_err(|_| BlogError::NotFound("post"))
}

fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

// ========== Feeds ==========

async fn home(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<PageParams>,
) -> BlogResult<Response> {
    let page = state.feeds.home(params.request()).await?;
    Ok(Html(pages::render_home_page(&page, user.as_ref()).into_string()).into_response())
}

async fn group_posts(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> BlogResult<Response> {
    let feed = state.feeds.group(&slug, params.request()).await?;
    Ok(Html(pages::render_group_page(&feed, user.as_ref()).into_string()).into_response())
}

async fn profile(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> BlogResult<Response> {
    let feed = state
        .feeds
        .profile(&username, user.as_ref(), params.request())
        .await?;
    Ok(Html(pages::render_profile_page(&feed, user.as_ref()).into_string()).into_response())
}

async fn follow_index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<PageParams>,
) -> BlogResult<Response> {
    let page = state.feeds.following(&user, params.request()).await?;
    Ok(Html(pages::render_following_page(&page, &user).into_string()).into_response())
}

// ========== Follow graph ==========

async fn profile_follow(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(username): Path<String>,
) -> BlogResult<Response> {
    let author = db::get_user_by_username(state.db.pool(), &username)
        .await
        .or_not_found("user")?;
    if state.follows.follow(&user, &author).await? {
        info!(user_id = user.id, author_id = author.id, "User followed author");
    }
    Ok(Redirect::to(&profile_url(&author.username)).into_response())
}

async fn profile_unfollow(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(username): Path<String>,
) -> BlogResult<Response> {
    let author = db::get_user_by_username(state.db.pool(), &username)
        .await
        .or_not_found("user")?;
    if state.follows.unfollow(&user, &author).await? {
        info!(user_id = user.id, author_id = author.id, "User unfollowed author");
    }
    Ok(Redirect::to(&profile_url(&author.username)).into_response())
}

// ========== Posts ==========

async fn post_detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(post_id): Path<String>,
) -> BlogResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let detail = posts::post_detail(&state.db, post_id).await?;
    Ok(Html(pages::render_post_detail_page(&detail, user.as_ref()).into_string()).into_response())
}

/// Render the post form. `post_id` is set when editing.
async fn render_post_form(
    state: &AppState,
    user: &User,
    post_id: Option<i64>,
    input: &PostInput,
    current_image: Option<&str>,
    errors: &FormErrors,
) -> BlogResult<Response> {
    let groups = db::list_groups(state.db.pool()).await?;
    let html = pages::render_post_form_page(&pages::PostFormParams {
        user,
        post_id,
        text: &input.text,
        group: &input.group,
        groups: &groups,
        current_image,
        errors,
    });
    Ok(Html(html.into_string()).into_response())
}

/// Collect the multipart post form into a [`PostInput`].
async fn read_post_form(mut multipart: Multipart) -> Result<PostInput, Response> {
    let mut input = PostInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => input.text = field.text().await.map_err(IntoResponse::into_response)?,
            "group" => input.group = field.text().await.map_err(IntoResponse::into_response)?,
            "image" => {
                let file_name = field.file_name().map(ToString::to_string);
                let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;
                input.image = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            other => debug!(field = other, "Ignoring unknown post form field"),
        }
    }

    Ok(input)
}

async fn create_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> BlogResult<Response> {
    render_post_form(
        &state,
        &user,
        None,
        &PostInput::default(),
        None,
        &FormErrors::new(),
    )
    .await
}

async fn create_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    multipart: Multipart,
) -> BlogResult<Response> {
    let input = match read_post_form(multipart).await {
        Ok(input) => input,
        Err(rejection) => return Ok(rejection),
    };

    match posts::create_post(&state.db, &state.media, &user, &input).await? {
        PostOutcome::Saved(_) => Ok(Redirect::to(&profile_url(&user.username)).into_response()),
        PostOutcome::Invalid(errors) => {
            render_post_form(&state, &user, None, &input, None, &errors).await
        }
        PostOutcome::NotAuthor => Ok(Redirect::to("/").into_response()),
    }
}

async fn edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> BlogResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let Some(post) = posts::load_editable(&state.db, &user, post_id).await? else {
        return Ok(Redirect::to(&post_url(post_id)).into_response());
    };

    let input = PostInput {
        text: post.text,
        group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
        image: None,
    };
    render_post_form(
        &state,
        &user,
        Some(post_id),
        &input,
        post.image.as_deref(),
        &FormErrors::new(),
    )
    .await
}

async fn edit_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> BlogResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let input = match read_post_form(multipart).await {
        Ok(input) => input,
        Err(rejection) => return Ok(rejection),
    };

    match posts::edit_post(&state.db, &state.media, &user, post_id, &input).await? {
        PostOutcome::Saved(_) | PostOutcome::NotAuthor => {
            Ok(Redirect::to(&post_url(post_id)).into_response())
        }
        PostOutcome::Invalid(errors) => {
            let current = db::get_post(state.db.pool(), post_id)
                .await?
                .and_then(|post| post.image);
            render_post_form(
                &state,
                &user,
                Some(post_id),
                &input,
                current.as_deref(),
                &errors,
            )
            .await
        }
    }
}

async fn delete_post(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> BlogResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    if posts::delete_post(&state.db, &user, post_id).await? {
        Ok(Redirect::to(&profile_url(&user.username)).into_response())
    } else {
        Ok(Redirect::to(&post_url(post_id)).into_response())
    }
}

async fn add_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    Form(input): Form<CommentInput>,
) -> BlogResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    posts::add_comment(&state.db, &user, post_id, &input).await?;
    Ok(Redirect::to(&post_url(post_id)).into_response())
}

// ========== Static pages ==========

async fn about_author(MaybeUser(user): MaybeUser) -> Response {
    Html(pages::render_author_page(user.as_ref()).into_string()).into_response()
}

async fn about_tech(MaybeUser(user): MaybeUser) -> Response {
    Html(pages::render_tech_page(user.as_ref()).into_string()).into_response()
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_id() {
        assert_eq!(parse_post_id("12").unwrap(), 12);
        assert!(parse_post_id("abc").unwrap_err().is_not_found());
        assert!(parse_post_id("").unwrap_err().is_not_found());
    }

    #[test]
    fn test_urls() {
        assert_eq!(post_url(3), "/posts/3/");
        assert_eq!(profile_url("elliot"), "/profile/elliot/");
    }

    #[test]
    fn test_page_params() {
        let params = PageParams {
            page: Some("2".to_string()),
        };
        assert_eq!(params.request(), PageRequest::number(2));
        assert_eq!(PageParams::default().request(), PageRequest::first());
    }
}
