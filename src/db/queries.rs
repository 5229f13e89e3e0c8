use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::forms::is_valid_slug;

use super::models::{
    CommentView, Group, NewGroup, NewPost, NewUser, Post, PostView, Session, User,
};

/// Columns selected for every feed listing; joined so templates need no further lookups.
const POST_VIEW_SELECT: &str = r"
    SELECT
        p.id,
        p.text,
        p.created_at,
        p.image,
        p.author_id,
        u.username AS author_username,
        u.first_name AS author_first_name,
        u.last_name AS author_last_name,
        p.group_id,
        g.slug AS group_slug,
        g.title AS group_title
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
";

/// Newest first; id breaks ties between posts created in the same millisecond.
const FEED_ORDER: &str = "ORDER BY p.created_at DESC, p.id DESC";

// ========== Users ==========

/// Get a user by ID.
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by id")
}

/// Get a user by username.
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by username")
}

/// Check if a username already exists.
pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await
        .context("Failed to check username existence")?;
    Ok(row.0 > 0)
}

/// Create a new user, returning its ID.
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO users (username, first_name, last_name, email, password_hash)
        VALUES (?, ?, ?, ?, ?)
        ",
    )
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(result.last_insert_rowid())
}

/// Whether `err` came from a UNIQUE constraint, e.g. a username taken by a
/// concurrent signup.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::Database(db_err)) if db_err.is_unique_violation()
        )
    })
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(row.0)
}

/// Update user active status.
pub async fn update_user_active(pool: &SqlitePool, user_id: i64, is_active: bool) -> Result<()> {
    sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to update user active status")?;
    Ok(())
}

/// Delete a user. Their posts, comments, sessions and follow edges go with them.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;
    Ok(result.rows_affected() > 0)
}

// ========== Sessions ==========

/// Create a new session.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    token: &str,
    expires_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO sessions (user_id, token, expires_at)
        VALUES (?, ?, ?)
        ",
    )
    .bind(user_id)
    .bind(token)
    .bind(expires_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(result.last_insert_rowid())
}

/// Get session by token.
pub async fn get_session_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    sqlx::query_as("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch session by token")
}

/// Update session last_used_at.
pub async fn update_session_last_used(pool: &SqlitePool, session_id: i64) -> Result<()> {
    sqlx::query(
        "UPDATE sessions SET last_used_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
    )
    .bind(session_id)
    .execute(pool)
    .await
    .context("Failed to update session last_used")?;
    Ok(())
}

/// Delete a session.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("Failed to delete session")?;
    Ok(())
}

/// Delete expired sessions.
pub async fn delete_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result =
        sqlx::query("DELETE FROM sessions WHERE expires_at < strftime('%Y-%m-%dT%H:%M:%fZ', 'now')")
            .execute(pool)
            .await
            .context("Failed to delete expired sessions")?;
    Ok(result.rows_affected())
}

// ========== Groups ==========

/// Insert a new group, returning its ID.
///
/// The slug appears in `/group/{slug}/` URLs and must be URL-safe.
pub async fn create_group(pool: &SqlitePool, group: &NewGroup) -> Result<i64> {
    if !is_valid_slug(&group.slug) {
        anyhow::bail!("Invalid group slug: {:?}", group.slug);
    }

    let result = sqlx::query(
        r"
        INSERT INTO post_groups (title, slug, description)
        VALUES (?, ?, ?)
        ",
    )
    .bind(&group.title)
    .bind(&group.slug)
    .bind(&group.description)
    .execute(pool)
    .await
    .context("Failed to create group")?;

    Ok(result.last_insert_rowid())
}

/// Get a group by ID.
pub async fn get_group(pool: &SqlitePool, id: i64) -> Result<Option<Group>> {
    sqlx::query_as("SELECT * FROM post_groups WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch group")
}

/// Get a group by its slug.
pub async fn get_group_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Group>> {
    sqlx::query_as("SELECT * FROM post_groups WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch group by slug")
}

/// All groups, ordered by title.
pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>> {
    sqlx::query_as("SELECT * FROM post_groups ORDER BY title, id")
        .fetch_all(pool)
        .await
        .context("Failed to list groups")
}

/// Delete a group. Its posts stay, with their group cleared.
pub async fn delete_group(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM post_groups WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete group")?;
    Ok(result.rows_affected() > 0)
}

// ========== Posts ==========

/// Insert a new post authored by `author_id`, returning its ID.
pub async fn insert_post(pool: &SqlitePool, author_id: i64, post: &NewPost) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO posts (text, author_id, group_id, image)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(&post.text)
    .bind(author_id)
    .bind(post.group_id)
    .bind(&post.image)
    .execute(pool)
    .await
    .context("Failed to insert post")?;

    Ok(result.last_insert_rowid())
}

/// Replace a post's editable fields. Author and creation time never change.
pub async fn update_post(pool: &SqlitePool, id: i64, post: &NewPost) -> Result<()> {
    sqlx::query(
        r"
        UPDATE posts
        SET text = ?, group_id = ?, image = ?
        WHERE id = ?
        ",
    )
    .bind(&post.text)
    .bind(post.group_id)
    .bind(&post.image)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    Ok(())
}

/// Delete a post and, through the foreign key, its comments.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;
    Ok(result.rows_affected() > 0)
}

/// Get a post row by ID.
pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    sqlx::query_as("SELECT * FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post")
}

/// Get a post with author and group details.
pub async fn get_post_view(pool: &SqlitePool, id: i64) -> Result<Option<PostView>> {
    sqlx::query_as(&format!("{POST_VIEW_SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post view")
}

/// Count all posts.
pub async fn count_posts(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;
    Ok(row.0)
}

/// Every post, newest first. This is the unpaginated home feed listing.
pub async fn list_posts(pool: &SqlitePool) -> Result<Vec<PostView>> {
    sqlx::query_as(&format!("{POST_VIEW_SELECT} {FEED_ORDER}"))
        .fetch_all(pool)
        .await
        .context("Failed to list posts")
}

/// Count posts written by an author.
pub async fn count_posts_by_author(pool: &SqlitePool, author_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count posts by author")?;
    Ok(row.0)
}

/// A window of an author's posts, newest first.
pub async fn list_posts_by_author(
    pool: &SqlitePool,
    author_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>> {
    sqlx::query_as(&format!(
        "{POST_VIEW_SELECT} WHERE p.author_id = ? {FEED_ORDER} LIMIT ? OFFSET ?"
    ))
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list posts by author")
}

/// Count posts filed under a group.
pub async fn count_posts_in_group(pool: &SqlitePool, group_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE group_id = ?")
        .bind(group_id)
        .fetch_one(pool)
        .await
        .context("Failed to count posts in group")?;
    Ok(row.0)
}

/// A window of a group's posts, newest first.
pub async fn list_posts_in_group(
    pool: &SqlitePool,
    group_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>> {
    sqlx::query_as(&format!(
        "{POST_VIEW_SELECT} WHERE p.group_id = ? {FEED_ORDER} LIMIT ? OFFSET ?"
    ))
    .bind(group_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list posts in group")
}

/// Count posts by authors that `user_id` follows.
pub async fn count_following_posts(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(
        r"
        SELECT COUNT(*)
        FROM posts p
        JOIN follows f ON f.author_id = p.author_id
        WHERE f.user_id = ?
        ",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to count following posts")?;
    Ok(row.0)
}

/// A window of posts by authors that `user_id` follows, newest first.
pub async fn list_following_posts(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>> {
    sqlx::query_as(&format!(
        r"
        {POST_VIEW_SELECT}
        JOIN follows f ON f.author_id = p.author_id
        WHERE f.user_id = ?
        {FEED_ORDER}
        LIMIT ? OFFSET ?
        "
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list following posts")
}

// ========== Comments ==========

/// Attach a comment to a post, returning its ID.
pub async fn insert_comment(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r"
        INSERT INTO comments (post_id, author_id, text)
        VALUES (?, ?, ?)
        ",
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .execute(pool)
    .await
    .context("Failed to insert comment")?;

    Ok(result.last_insert_rowid())
}

/// Comments on a post, newest first.
pub async fn list_comments_for_post(pool: &SqlitePool, post_id: i64) -> Result<Vec<CommentView>> {
    sqlx::query_as(
        r"
        SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text, c.created_at
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ?
        ORDER BY c.created_at DESC, c.id DESC
        ",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments for post")
}

/// Count comments on a post.
pub async fn count_comments_for_post(pool: &SqlitePool, post_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE post_id = ?")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;
    Ok(row.0)
}

// ========== Follows ==========

/// Insert a follow edge unless it already exists. Returns whether a row was written.
///
/// Only the uniqueness conflict is absorbed; a self-follow still fails the
/// table's CHECK constraint.
pub async fn insert_follow(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool> {
    let result = sqlx::query(
        r"
        INSERT INTO follows (user_id, author_id)
        VALUES (?, ?)
        ON CONFLICT (user_id, author_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(author_id)
    .execute(pool)
    .await
    .context("Failed to insert follow")?;

    Ok(result.rows_affected() > 0)
}

/// Remove a follow edge. Returns whether one existed.
pub async fn delete_follow(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await
        .context("Failed to delete follow")?;
    Ok(result.rows_affected() > 0)
}

/// Check whether `user_id` follows `author_id`.
pub async fn follow_exists(pool: &SqlitePool, user_id: i64, author_id: i64) -> Result<bool> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .fetch_one(pool)
            .await
            .context("Failed to check follow existence")?;
    Ok(row.0 > 0)
}

/// Number of users following an author.
pub async fn count_followers(pool: &SqlitePool, author_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .context("Failed to count followers")?;
    Ok(row.0)
}

/// Number of authors a user follows.
pub async fn count_following(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("Failed to count following")?;
    Ok(row.0)
}

/// Total number of follow edges.
pub async fn count_follows(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows")
        .fetch_one(pool)
        .await
        .context("Failed to count follows")?;
    Ok(row.0)
}
