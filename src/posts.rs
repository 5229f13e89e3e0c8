//! Post and comment mutations on behalf of an authenticated caller.
//!
//! The author of a new post is always the caller. Only the author may edit
//! or delete a post; other callers get [`PostOutcome::NotAuthor`] and nothing
//! is written. Invalid submissions come back as [`FormErrors`] with no side
//! effects, including on the media store.

use tracing::{debug, info};

use crate::db::{self, CommentView, Database, NewPost, Post, PostView, User};
use crate::error::{BlogResult, OrNotFound};
use crate::forms::{CommentInput, FormErrors, PostInput, INVALID_CHOICE};
use crate::media::{detect_image, ImageKind, MediaStore};

/// Result of a create or edit attempt.
#[derive(Debug)]
pub enum PostOutcome {
    /// The post was written; carries its id.
    Saved(i64),
    /// The form was rejected; nothing was written.
    Invalid(FormErrors),
    /// The caller is not the post's author; nothing was written.
    NotAuthor,
}

/// A post page: the post, its comments and the author's post count.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub author_post_count: i64,
}

/// Form fields after validation, with the image not yet written.
struct CleanPost<'a> {
    text: String,
    group_id: Option<i64>,
    image: Option<(&'a [u8], ImageKind)>,
}

async fn clean_post<'a>(
    db: &Database,
    input: &'a PostInput,
) -> BlogResult<Result<CleanPost<'a>, FormErrors>> {
    let mut errors = FormErrors::new();

    let text = input.clean_text(&mut errors);

    let group_id = match input.clean_group_id(&mut errors) {
        Some(Some(id)) => {
            if db::get_group(db.pool(), id).await?.is_some() {
                Some(Some(id))
            } else {
                errors.add("group", INVALID_CHOICE);
                None
            }
        }
        other => other,
    };

    let image = match input.upload() {
        Some(upload) => match detect_image(&upload.bytes) {
            Ok(kind) => Some((upload.bytes.as_slice(), kind)),
            Err(message) => {
                errors.add("image", message);
                None
            }
        },
        None => None,
    };

    match (text, group_id) {
        (Some(text), Some(group_id)) if errors.is_empty() => Ok(Ok(CleanPost {
            text,
            group_id,
            image,
        })),
        _ => Ok(Err(errors)),
    }
}

/// Validate `input` and store it as a new post by `caller`.
pub async fn create_post(
    db: &Database,
    media: &MediaStore,
    caller: &User,
    input: &PostInput,
) -> BlogResult<PostOutcome> {
    let clean = match clean_post(db, input).await? {
        Ok(clean) => clean,
        Err(errors) => {
            debug!(user_id = caller.id, "Rejected invalid post form");
            return Ok(PostOutcome::Invalid(errors));
        }
    };

    let image = match clean.image {
        Some((bytes, kind)) => Some(media.save_image(bytes, kind).await?),
        None => None,
    };

    let post = NewPost {
        text: clean.text,
        group_id: clean.group_id,
        image,
    };
    let id = db::insert_post(db.pool(), caller.id, &post).await?;
    info!(post_id = id, user_id = caller.id, "Post created");

    Ok(PostOutcome::Saved(id))
}

/// Validate `input` and apply it to post `post_id`.
///
/// The existing image is kept unless a new one is uploaded.
///
/// # Errors
///
/// `NotFound` if the post does not exist.
pub async fn edit_post(
    db: &Database,
    media: &MediaStore,
    caller: &User,
    post_id: i64,
    input: &PostInput,
) -> BlogResult<PostOutcome> {
    let existing = db::get_post(db.pool(), post_id).await.or_not_found("post")?;
    if existing.author_id != caller.id {
        debug!(post_id, user_id = caller.id, "Edit attempt by non-author");
        return Ok(PostOutcome::NotAuthor);
    }

    let clean = match clean_post(db, input).await? {
        Ok(clean) => clean,
        Err(errors) => return Ok(PostOutcome::Invalid(errors)),
    };

    let image = match clean.image {
        Some((bytes, kind)) => Some(media.save_image(bytes, kind).await?),
        None => existing.image,
    };

    let post = NewPost {
        text: clean.text,
        group_id: clean.group_id,
        image,
    };
    db::update_post(db.pool(), post_id, &post).await?;
    info!(post_id, user_id = caller.id, "Post edited");

    Ok(PostOutcome::Saved(post_id))
}

/// The post as stored, if `caller` may edit it.
///
/// # Errors
///
/// `NotFound` if the post does not exist.
pub async fn load_editable(db: &Database, caller: &User, post_id: i64) -> BlogResult<Option<Post>> {
    let post = db::get_post(db.pool(), post_id).await.or_not_found("post")?;
    Ok((post.author_id == caller.id).then_some(post))
}

/// Delete post `post_id` and its comments if `caller` wrote it.
/// Returns whether the post was deleted.
///
/// # Errors
///
/// `NotFound` if the post does not exist.
pub async fn delete_post(db: &Database, caller: &User, post_id: i64) -> BlogResult<bool> {
    let post = db::get_post(db.pool(), post_id).await.or_not_found("post")?;
    if post.author_id != caller.id {
        debug!(post_id, user_id = caller.id, "Delete attempt by non-author");
        return Ok(false);
    }

    let deleted = db::delete_post(db.pool(), post_id).await?;
    info!(post_id, user_id = caller.id, "Post deleted");
    Ok(deleted)
}

/// Attach a comment by `caller` to post `post_id`.
///
/// Returns the comment id, or `None` if the comment was blank and dropped.
///
/// # Errors
///
/// `NotFound` if the post does not exist.
pub async fn add_comment(
    db: &Database,
    caller: &User,
    post_id: i64,
    input: &CommentInput,
) -> BlogResult<Option<i64>> {
    db::get_post(db.pool(), post_id).await.or_not_found("post")?;

    let Ok(text) = input.clean() else {
        debug!(post_id, user_id = caller.id, "Dropped blank comment");
        return Ok(None);
    };

    let id = db::insert_comment(db.pool(), post_id, caller.id, &text).await?;
    info!(comment_id = id, post_id, user_id = caller.id, "Comment added");
    Ok(Some(id))
}

/// Everything the post page shows.
///
/// # Errors
///
/// `NotFound` if the post does not exist.
pub async fn post_detail(db: &Database, post_id: i64) -> BlogResult<PostDetail> {
    let pool = db.pool();
    let post = db::get_post_view(pool, post_id).await.or_not_found("post")?;
    let comments = db::list_comments_for_post(pool, post_id).await?;
    let author_post_count = db::count_posts_by_author(pool, post.author_id).await?;

    Ok(PostDetail {
        post,
        comments,
        author_post_count,
    })
}
