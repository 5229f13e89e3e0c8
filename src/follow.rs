//! Directed follow edges between users (follower -> followed author).
//!
//! The `follows` table enforces one edge per pair and rejects self-follows.
//! [`FollowGraph::follow`] also checks for a self-follow before writing, so
//! the storage constraint is only reached by code that bypasses this type.

use anyhow::Result;
use tracing::debug;

use crate::db::{self, Database, User};

#[derive(Debug, Clone)]
pub struct FollowGraph {
    db: Database,
}

impl FollowGraph {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Make `follower` follow `target`.
    ///
    /// Idempotent: an existing edge or a self-follow is a silent no-op.
    /// Returns whether a new edge was created.
    pub async fn follow(&self, follower: &User, target: &User) -> Result<bool> {
        if follower.id == target.id {
            debug!(user_id = follower.id, "Ignoring self-follow");
            return Ok(false);
        }

        let created = db::insert_follow(self.db.pool(), follower.id, target.id).await?;
        if created {
            debug!(
                follower_id = follower.id,
                author_id = target.id,
                "Follow edge created"
            );
        }
        Ok(created)
    }

    /// Remove the edge from `follower` to `target` if it exists.
    /// Returns whether an edge was removed.
    pub async fn unfollow(&self, follower: &User, target: &User) -> Result<bool> {
        let removed = db::delete_follow(self.db.pool(), follower.id, target.id).await?;
        if removed {
            debug!(
                follower_id = follower.id,
                author_id = target.id,
                "Follow edge removed"
            );
        }
        Ok(removed)
    }

    pub async fn is_following(&self, follower: &User, target: &User) -> Result<bool> {
        db::follow_exists(self.db.pool(), follower.id, target.id).await
    }

    /// How many users follow `author`.
    pub async fn follower_count(&self, author: &User) -> Result<i64> {
        db::count_followers(self.db.pool(), author.id).await
    }

    /// How many authors `user` follows.
    pub async fn following_count(&self, user: &User) -> Result<i64> {
        db::count_following(self.db.pool(), user.id).await
    }
}
