//! Feed assembly: ordered, paginated post listings for the home page,
//! group pages, profiles and a follower's aggregated feed.
//!
//! Every feed is ordered newest first. Only the home feed goes through the
//! cache; its unpaginated listing is stored under [`HOME_FEED_CACHE_KEY`] and
//! served until the entry expires. Writes never invalidate it, so a new post
//! stays invisible to cached readers for up to one TTL.

pub mod cache;
pub mod paginator;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::db::{self, Database, Group, PostView, User};
use crate::error::{BlogResult, OrNotFound};
use crate::follow::FollowGraph;

pub use cache::{Cache, MemoryCache, NullCache};
pub use paginator::{Page, PageRequest, Paginator, DEFAULT_PER_PAGE};

/// Cache key for the unpaginated home feed listing.
pub const HOME_FEED_CACHE_KEY: &str = "index_page";

/// The full home feed listing as cached.
pub type HomeListing = Arc<Vec<PostView>>;

/// Which posts a feed is built from.
#[derive(Debug, Clone, Copy)]
pub enum FeedScope<'a> {
    /// Every post.
    Home,
    /// Posts filed under the group with this slug.
    Group(&'a str),
    /// Posts written by this username, as seen by an optional viewer.
    Profile {
        username: &'a str,
        viewer: Option<&'a User>,
    },
    /// Posts by authors the caller follows.
    Following(&'a User),
}

/// A group page.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<PostView>,
}

/// A profile page with the author's follow statistics.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: User,
    pub page: Page<PostView>,
    pub follower_count: i64,
    pub following_count: i64,
    /// Whether the viewer follows the author; false for anonymous viewers.
    pub is_following: bool,
}

/// Result of [`FeedAssembler::assemble`].
#[derive(Debug, Clone)]
pub enum Feed {
    Home(Page<PostView>),
    Group(GroupFeed),
    Profile(ProfileFeed),
    Following(Page<PostView>),
}

impl Feed {
    /// The page of posts, whatever the scope.
    #[must_use]
    pub const fn page(&self) -> &Page<PostView> {
        match self {
            Self::Home(page) | Self::Following(page) => page,
            Self::Group(feed) => &feed.page,
            Self::Profile(feed) => &feed.page,
        }
    }
}

/// Builds feeds from the post store, with the home listing cached.
#[derive(Clone)]
pub struct FeedAssembler {
    db: Database,
    follows: FollowGraph,
    cache: Arc<dyn Cache<HomeListing>>,
    per_page: usize,
    home_ttl: Duration,
}

impl FeedAssembler {
    #[must_use]
    pub fn new(
        db: Database,
        cache: Arc<dyn Cache<HomeListing>>,
        per_page: usize,
        home_ttl: Duration,
    ) -> Self {
        Self {
            follows: FollowGraph::new(db.clone()),
            db,
            cache,
            per_page: per_page.max(1),
            home_ttl,
        }
    }

    /// Assembler with an in-memory home cache, or none when the TTL is zero.
    #[must_use]
    pub fn from_config(db: Database, config: &Config) -> Self {
        let cache: Arc<dyn Cache<HomeListing>> = if config.home_feed_cache_enabled() {
            Arc::new(MemoryCache::new())
        } else {
            Arc::new(NullCache)
        };
        Self::new(db, cache, config.posts_per_page, config.home_feed_cache_ttl)
    }

    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Build the feed for `scope` and return the requested page.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown group slug or username.
    pub async fn assemble(&self, scope: FeedScope<'_>, page: PageRequest) -> BlogResult<Feed> {
        match scope {
            FeedScope::Home => self.home(page).await.map(Feed::Home),
            FeedScope::Group(slug) => self.group(slug, page).await.map(Feed::Group),
            FeedScope::Profile { username, viewer } => self
                .profile(username, viewer, page)
                .await
                .map(Feed::Profile),
            FeedScope::Following(viewer) => self.following(viewer, page).await.map(Feed::Following),
        }
    }

    /// A page of the home feed, served from the cached listing when fresh.
    pub async fn home(&self, page: PageRequest) -> BlogResult<Page<PostView>> {
        let listing = self.home_listing().await?;
        Ok(Paginator::new(listing.len(), self.per_page).slice(page, &listing))
    }

    /// The full home listing, recomputed and re-cached on a miss.
    pub async fn home_listing(&self) -> BlogResult<HomeListing> {
        if let Some(listing) = self.cache.get(HOME_FEED_CACHE_KEY) {
            debug!(posts = listing.len(), "Home feed cache hit");
            return Ok(listing);
        }

        let listing: HomeListing = Arc::new(db::list_posts(self.db.pool()).await?);
        debug!(posts = listing.len(), "Home feed cache miss, listing rebuilt");
        self.cache
            .set(HOME_FEED_CACHE_KEY, Arc::clone(&listing), self.home_ttl);
        Ok(listing)
    }

    /// Drop the cached home listing so the next read sees current posts.
    pub fn invalidate_home(&self) {
        self.cache.delete(HOME_FEED_CACHE_KEY);
    }

    /// A page of posts in the group with `slug`.
    ///
    /// # Errors
    ///
    /// `NotFound` if no group has that slug.
    pub async fn group(&self, slug: &str, page: PageRequest) -> BlogResult<GroupFeed> {
        let pool = self.db.pool();
        let group = db::get_group_by_slug(pool, slug)
            .await
            .or_not_found("group")?;

        let count = db::count_posts_in_group(pool, group.id).await?;
        let group_id = group.id;
        let page = self
            .windowed(count, page, move |limit, offset| {
                db::list_posts_in_group(pool, group_id, limit, offset)
            })
            .await?;

        Ok(GroupFeed { group, page })
    }

    /// A page of posts by `username`, with follow statistics for the viewer.
    ///
    /// # Errors
    ///
    /// `NotFound` if no user has that username.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&User>,
        page: PageRequest,
    ) -> BlogResult<ProfileFeed> {
        let pool = self.db.pool();
        let author = db::get_user_by_username(pool, username)
            .await
            .or_not_found("user")?;

        let count = db::count_posts_by_author(pool, author.id).await?;
        let author_id = author.id;
        let page = self
            .windowed(count, page, move |limit, offset| {
                db::list_posts_by_author(pool, author_id, limit, offset)
            })
            .await?;

        let is_following = match viewer {
            Some(viewer) => self.follows.is_following(viewer, &author).await?,
            None => false,
        };
        let follower_count = self.follows.follower_count(&author).await?;
        let following_count = self.follows.following_count(&author).await?;

        Ok(ProfileFeed {
            author,
            page,
            follower_count,
            following_count,
            is_following,
        })
    }

    /// A page of posts by the authors `viewer` follows.
    pub async fn following(&self, viewer: &User, page: PageRequest) -> BlogResult<Page<PostView>> {
        let pool = self.db.pool();
        let count = db::count_following_posts(pool, viewer.id).await?;
        let viewer_id = viewer.id;
        self.windowed(count, page, move |limit, offset| {
            db::list_following_posts(pool, viewer_id, limit, offset)
        })
        .await
    }

    /// Clamp the request against `count`, then fetch just that page's rows.
    async fn windowed<F, Fut>(
        &self,
        count: i64,
        request: PageRequest,
        fetch: F,
    ) -> BlogResult<Page<PostView>>
    where
        F: FnOnce(i64, i64) -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<PostView>>>,
    {
        let paginator = Paginator::new(usize::try_from(count).unwrap_or(0), self.per_page);
        let number = paginator.clamp(request);
        let items = fetch(self.per_page as i64, paginator.offset(number) as i64).await?;
        Ok(paginator.page(number, items))
    }
}
