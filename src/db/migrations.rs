use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

/// Run all pending migrations.
pub async fn run(pool: &SqlitePool) -> Result<()> {
    create_migration_table(pool).await?;
    let current_version = get_schema_version(pool).await?;

    if current_version < 1 {
        debug!("Running migration v1");
        run_migration_v1(pool).await?;
        set_schema_version(pool, 1).await?;
    }

    if current_version < 2 {
        debug!("Running migration v2");
        run_migration_v2(pool).await?;
        set_schema_version(pool, 2).await?;
    }

    Ok(())
}

async fn create_migration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS _schema_version (
            version INTEGER PRIMARY KEY
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create schema version table")?;

    Ok(())
}

async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT version FROM _schema_version LIMIT 1")
        .fetch_optional(pool)
        .await
        .context("Failed to get schema version")?;

    Ok(row.map_or(0, |(v,)| v))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("DELETE FROM _schema_version")
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO _schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Millisecond-precision UTC timestamp, so feed ordering rarely needs the id tie-break.
const NOW_MILLIS: &str = "(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))";

async fn run_migration_v1(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v1: creating initial schema");

    // Users table
    sqlx::query(&format!(
        r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            password_hash TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT {NOW_MILLIS}
        )
        "
    ))
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    // Sessions table
    sqlx::query(&format!(
        r"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token TEXT UNIQUE NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT {NOW_MILLIS},
            last_used_at TEXT NOT NULL DEFAULT {NOW_MILLIS}
        )
        "
    ))
    .execute(pool)
    .await
    .context("Failed to create sessions table")?;

    // Groups table
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS post_groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            description TEXT NOT NULL DEFAULT ''
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create post_groups table")?;

    // Posts table
    sqlx::query(&format!(
        r"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT {NOW_MILLIS},
            author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            group_id INTEGER REFERENCES post_groups(id) ON DELETE SET NULL,
            image TEXT
        )
        "
    ))
    .execute(pool)
    .await
    .context("Failed to create posts table")?;

    // Comments table
    sqlx::query(&format!(
        r"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT {NOW_MILLIS}
        )
        "
    ))
    .execute(pool)
    .await
    .context("Failed to create comments table")?;

    // Follow edges: follower (user_id) -> followed author (author_id)
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS follows (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            CONSTRAINT profile_follow_rule UNIQUE (user_id, author_id),
            CONSTRAINT prevent_self_follow_rule CHECK (user_id <> author_id)
        )
        ",
    )
    .execute(pool)
    .await
    .context("Failed to create follows table")?;

    Ok(())
}

async fn run_migration_v2(pool: &SqlitePool) -> Result<()> {
    debug!("Running migration v2: feed indexes");

    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at DESC, id DESC)",
        "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_posts_group ON posts(group_id, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_follows_author ON follows(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to run: {statement}"))?;
    }

    Ok(())
}
